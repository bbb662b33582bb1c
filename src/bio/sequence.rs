use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub description: Option<String>,
    /// Header text after '>' exactly as read, when parsed from a file
    pub raw_header: Option<String>,
    pub sequence: Vec<u8>,
}

impl Sequence {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            raw_header: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_raw_header(mut self, raw_header: String) -> Self {
        self.raw_header = Some(raw_header);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The whole header line without the leading '>': id plus any description.
    ///
    /// This is what the cluster report prints in its `SequenceID` column. A
    /// header read from a file comes back byte for byte.
    pub fn full_description(&self) -> String {
        if let Some(raw) = &self.raw_header {
            return raw.clone();
        }
        match &self.description {
            Some(desc) if !desc.is_empty() => format!("{} {}", self.id, desc),
            _ => self.id.clone(),
        }
    }

    pub fn header(&self) -> String {
        format!(">{}", self.full_description())
    }
}
