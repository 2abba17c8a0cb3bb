//! User-defined task categories

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The server-assigned identifier of a [`Category`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId {
    content: String,
}

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for CategoryId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for CategoryId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}


/// A label that can be applied to tasks, independently of their date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    id: CategoryId,
    name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> &CategoryId { &self.id   }
    pub fn name(&self) -> &str      { &self.name }
}
