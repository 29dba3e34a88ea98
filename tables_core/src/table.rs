use crate::config::{EntryConfig, TableFileConfig};
use crate::draw::TableDraw;
use crate::RollError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A roll table: `NdF + modifier` selects one entry by range
#[derive(Debug, Clone)]
pub struct RollTable {
    pub id: String,
    pub name: String,
    pub description: String,
    dice: u32,
    faces: u32,
    entries: Vec<TableEntry>,
}

/// One result row, covering the inclusive total range `min..=max`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub min: i64,
    pub max: i64,
    pub text: String,
    pub key: Option<String>,
}

impl TableEntry {
    fn covers(&self, total: i64) -> bool {
        self.min <= total && total <= self.max
    }
}

impl RollTable {
    /// Parse a roll table from config
    pub fn from_config(config: TableFileConfig) -> Result<Self, RollError> {
        let id = config.table.id;
        if config.table.dice == 0 || config.table.faces == 0 {
            return Err(RollError::InvalidDice {
                table: id,
                dice: config.table.dice,
                faces: config.table.faces,
            });
        }

        let mut entries: Vec<TableEntry> = config
            .entries
            .into_iter()
            .map(|e| TableEntry::from_config(&id, e))
            .collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.min);

        for pair in entries.windows(2) {
            if pair[1].min <= pair[0].max {
                return Err(RollError::OverlappingRanges {
                    table: id,
                    at: pair[1].min,
                });
            }
        }

        Ok(RollTable {
            name: config.table.name.unwrap_or_else(|| id.clone()),
            id,
            description: config.table.description,
            dice: config.table.dice,
            faces: config.table.faces,
            entries,
        })
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Find the entry for a total
    ///
    /// Totals below the first range or above the last one clamp to that end
    /// entry, so modified rolls always land somewhere. Gaps between ranges
    /// select nothing.
    pub fn lookup(&self, total: i64) -> Option<&TableEntry> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;
        if total < first.min {
            return Some(first);
        }
        if total > last.max {
            return Some(last);
        }
        self.entries.iter().find(|e| e.covers(total))
    }

    /// Roll this table's dice and add `modifier`
    pub fn roll<R: Rng>(&self, modifier: i64, rng: &mut R) -> TableDraw {
        let dice = (0..self.dice).map(|_| rng.gen_range(1..=self.faces)).collect();
        self.draw_with(dice, modifier)
    }

    /// Draw with dice rolled elsewhere
    pub fn draw_with(&self, dice: Vec<u32>, modifier: i64) -> TableDraw {
        let rolled: i64 = dice.iter().map(|d| *d as i64).sum();
        let total = rolled + modifier;
        let entry = self.lookup(total).cloned();
        if entry.is_none() {
            tracing::warn!(table = %self.id, total, "Roll total matched no table entry");
        }

        TableDraw {
            table_id: self.id.clone(),
            dice,
            faces: self.faces,
            modifier,
            total,
            entry,
        }
    }
}

impl TableEntry {
    fn from_config(table: &str, config: EntryConfig) -> Result<Self, RollError> {
        let (min, max) = (config.range.min(), config.range.max());
        if min > max {
            return Err(RollError::InvalidRange {
                table: table.to_string(),
                min,
                max,
            });
        }

        Ok(TableEntry {
            min,
            max,
            text: config.text,
            key: config.key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RangeConfig, TableConfig};
    use rand::SeedableRng;

    fn table(ranges: &[(i64, i64)]) -> Result<RollTable, RollError> {
        RollTable::from_config(TableFileConfig {
            table: TableConfig {
                id: "t".to_string(),
                name: None,
                description: String::new(),
                dice: 1,
                faces: 6,
            },
            entries: ranges
                .iter()
                .map(|(min, max)| EntryConfig {
                    range: RangeConfig::Range([*min, *max]),
                    text: format!("{}-{}", min, max),
                    key: None,
                })
                .collect(),
        })
    }

    #[test]
    fn test_lookup_by_range() {
        let t = table(&[(1, 3), (4, 6)]).unwrap();
        assert_eq!(t.lookup(2).unwrap().text, "1-3");
        assert_eq!(t.lookup(4).unwrap().text, "4-6");
    }

    #[test]
    fn test_lookup_clamps_ends() {
        let t = table(&[(1, 6), (7, 7), (15, 15)]).unwrap();
        assert_eq!(t.lookup(-3).unwrap().text, "1-6");
        assert_eq!(t.lookup(22).unwrap().text, "15-15");
        assert!(t.lookup(10).is_none());
    }

    #[test]
    fn test_entries_sorted() {
        let t = table(&[(4, 6), (1, 3)]).unwrap();
        assert_eq!(t.entries()[0].min, 1);
    }

    #[test]
    fn test_overlap_rejected() {
        let err = table(&[(1, 4), (4, 6)]).unwrap_err();
        assert!(matches!(err, RollError::OverlappingRanges { at: 4, .. }));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(matches!(table(&[(5, 2)]), Err(RollError::InvalidRange { .. })));
    }

    #[test]
    fn test_draw_with_modifier() {
        let t = table(&[(1, 6), (7, 12)]).unwrap();
        let draw = t.draw_with(vec![4], 3);
        assert_eq!(draw.total, 7);
        assert_eq!(draw.text(), Some("7-12"));
        assert_eq!(draw.formula(), "1d6+3");
        assert_eq!(t.draw_with(vec![2], -1).formula(), "1d6-1");
    }

    #[test]
    fn test_roll_stays_in_die_range() {
        let t = table(&[(1, 6)]).unwrap();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let draw = t.roll(0, &mut rng);
            assert!((1..=6).contains(&draw.total));
        }
    }
}
