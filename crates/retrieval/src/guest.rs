//! The guest record and its canonical text form.

use serde::{Deserialize, Serialize};

/// One invitee on the gala guest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub name: String,
    pub relation: String,
    pub description: String,
    pub email: String,
}

impl GuestRecord {
    pub fn new(
        name: impl Into<String>,
        relation: impl Into<String>,
        description: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relation: relation.into(),
            description: description.into(),
            email: email.into(),
        }
    }

    /// Serialize into the document text that gets indexed and returned to the model.
    ///
    /// Field order is fixed: Name, Relation, Description, Email, one per line.
    pub fn to_document(&self) -> String {
        format!(
            "Name: {}\nRelation: {}\nDescription: {}\nEmail: {}",
            self.name, self.relation, self.description, self.email
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_layout() {
        let guest = GuestRecord::new("Ada Lovelace", "guest", "mathematician", "a@x");
        assert_eq!(
            guest.to_document(),
            "Name: Ada Lovelace\nRelation: guest\nDescription: mathematician\nEmail: a@x"
        );
    }

    #[test]
    fn deserializes_dataset_row() {
        let row = serde_json::json!({
            "name": "Dr. Nikola Tesla",
            "relation": "old friend from university days",
            "description": "Inventor of the alternating current motor.",
            "email": "nikola.tesla@gmail.com"
        });
        let guest: GuestRecord = serde_json::from_value(row).unwrap();
        assert_eq!(guest.name, "Dr. Nikola Tesla");
        assert!(guest.to_document().starts_with("Name: Dr. Nikola Tesla\nRelation: old friend"));
    }
}
