use std::fmt;

use itertools::Itertools;

use super::DirectiveDefinition;
use super::FieldDefinition;
use super::ObjectType;
use super::ScalarType;
use super::TypeDefinition;
use super::TypeGraph;

const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Prints the part of the graph the decorators manage as SDL: custom directive definitions,
/// custom scalars, and object types. Interfaces, unions, enums and input objects are left out.
impl fmt::Display for TypeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let directives = self.directive_definitions().map(|d| d.to_string());
        let types = self.types().filter_map(|ty| match ty {
            TypeDefinition::Scalar(scalar) if BUILT_IN_SCALARS.contains(&scalar.name.as_str()) => {
                None
            }
            TypeDefinition::Scalar(scalar) => Some(scalar.to_string()),
            TypeDefinition::Object(object) => Some(object.to_string()),
            TypeDefinition::Other(_) => None,
        });
        write!(f, "{}", directives.chain(types).join("\n\n"))
    }
}

impl fmt::Display for DirectiveDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_description(f, self.description.as_deref(), "")?;
        write!(
            f,
            "directive @{} on {}",
            self.name,
            self.locations.iter().join(" | ")
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_description(f, self.description.as_deref(), "")?;
        write!(f, "scalar {}", self.name)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_description(f, self.description.as_deref(), "")?;
        write!(f, "type {}", self.name)?;
        for directive in &self.directives {
            write!(f, " @{directive}")?;
        }
        writeln!(f, " {{")?;
        for field in self.fields.values() {
            writeln!(f, "{field}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_description(f, self.description.as_deref(), "  ")?;
        write!(f, "  {}", self.name)?;
        if !self.arguments.is_empty() {
            let arguments = self
                .arguments
                .values()
                .map(|argument| format!("{}: {}", argument.name, argument.ty))
                .join(", ");
            write!(f, "({arguments})")?;
        }
        write!(f, ": {}", self.ty)
    }
}

fn write_description(
    f: &mut fmt::Formatter<'_>,
    description: Option<&str>,
    indent: &str,
) -> fmt::Result {
    match description {
        Some(description) if !description.is_empty() => {
            writeln!(f, "{indent}\"\"\"")?;
            for line in description.lines() {
                writeln!(f, "{indent}{line}")?;
            }
            writeln!(f, "{indent}\"\"\"")
        }
        _ => Ok(()),
    }
}
