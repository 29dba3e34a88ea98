use crate::table::TableEntry;
use serde::{Deserialize, Serialize};

/// Result of drawing from a roll table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDraw {
    pub table_id: String,
    /// Faces rolled, one per die
    pub dice: Vec<u32>,
    pub faces: u32,
    pub modifier: i64,
    pub total: i64,
    /// Entry selected by the total; `None` only for a table with no entries
    pub entry: Option<TableEntry>,
}

impl TableDraw {
    /// Roll formula as displayed in the chat log, e.g. `1d6+3`
    pub fn formula(&self) -> String {
        let base = format!("{}d{}", self.dice.len(), self.faces);
        match self.modifier {
            0 => base,
            m if m > 0 => format!("{}+{}", base, m),
            m => format!("{}{}", base, m),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.text.as_str())
    }
}
