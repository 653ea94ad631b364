// Declaration records emitted per interface. Built once, never mutated afterwards.
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityEntry;
use crate::types::TypeMetadata;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeMetadata,
    pub type_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDecl {
    pub name: String,
    pub parameters: Vec<ParameterDecl>,
    pub result: TypeMetadata,
    pub type_string: String,
    pub availability: Vec<AvailabilityEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeMetadata,
    pub getter: String,
    pub setter: String,
    /// `@property (class)`.
    #[serde(rename = "static")]
    pub is_static: bool,
    pub readonly: bool,
    pub nonatomic: bool,
    pub weak: bool,
    pub availability: Vec<AvailabilityEntry>,
}

/// Name + declaring file of a referenced class. Not a live link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRef {
    pub name: String,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: String,
    pub file: String,
    /// Absent for root classes.
    #[serde(rename = "super", default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<ClassRef>,
    #[serde(default)]
    pub protocols: Vec<String>,
    pub properties: Vec<PropertyDecl>,
    pub instance_methods: Vec<MethodDecl>,
    pub class_methods: Vec<MethodDecl>,
    pub availability: Vec<AvailabilityEntry>,
    pub type_string: String,
}

impl InterfaceDecl {
    pub fn member_count(&self) -> usize {
        self.properties.len() + self.instance_methods.len() + self.class_methods.len()
    }
}
