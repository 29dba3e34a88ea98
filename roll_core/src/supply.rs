//! Consumable Depletion Engine planning
//!
//! A supply check rolls one stress die per unit of the actor's supply. Each
//! die showing the panic face burns one unit. This module decides which item
//! stacks pay; the action handler performs the writes.

use serde::{Deserialize, Serialize};
use sheet_core::{Actor, Consumable, ItemId};

/// One item holding some of a supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStack {
    pub item: ItemId,
    pub quantity: i64,
}

/// Active items carrying `consumable`, in item order
pub fn supply_stacks(actor: &Actor, consumable: Consumable) -> Vec<SupplyStack> {
    actor
        .items
        .iter()
        .filter(|item| item.active)
        .filter_map(|item| {
            item.supply(consumable).map(|quantity| SupplyStack {
                item: item.id.clone(),
                quantity,
            })
        })
        .collect()
}

/// A single stack decrement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDraw {
    pub item: ItemId,
    pub from: i64,
    pub to: i64,
}

/// Writes a depletion needs, in the order they must land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepletionPlan {
    pub consumable: Consumable,
    pub stacks: Vec<StackDraw>,
    pub aggregate_from: i64,
    pub aggregate_to: i64,
}

impl DepletionPlan {
    /// Units actually taken from stacks
    pub fn amount(&self) -> i64 {
        self.aggregate_from - self.aggregate_to
    }
}

/// Plan a depletion of `signal` units
///
/// Without carry, the first stack holding at least one unit pays the whole
/// signal and may go negative. With carry, stacks pay in order up to what
/// each holds. Returns `None` when no stack holds anything.
pub fn plan_depletion(
    consumable: Consumable,
    stacks: &[SupplyStack],
    aggregate: i64,
    signal: i64,
    carry: bool,
) -> Option<DepletionPlan> {
    let mut qualifying = stacks.iter().filter(|s| s.quantity >= 1).peekable();
    qualifying.peek()?;

    let mut draws = Vec::new();
    let mut remaining = signal;
    if carry {
        for stack in qualifying {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(stack.quantity);
            draws.push(StackDraw {
                item: stack.item.clone(),
                from: stack.quantity,
                to: stack.quantity - take,
            });
            remaining -= take;
        }
    } else if let Some(first) = qualifying.next() {
        draws.push(StackDraw {
            item: first.item.clone(),
            from: first.quantity,
            to: first.quantity - signal,
        });
        remaining = 0;
    }

    let taken = signal - remaining;
    Some(DepletionPlan {
        consumable,
        stacks: draws,
        aggregate_from: aggregate,
        aggregate_to: aggregate - taken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::{ActorKind, CharacterSheet, Item, ItemKind};

    fn stack(id: &str, quantity: i64) -> SupplyStack {
        SupplyStack {
            item: ItemId::from(id),
            quantity,
        }
    }

    #[test]
    fn test_first_match_only() {
        let stacks = [stack("empty", 0), stack("tank", 1), stack("spare", 5)];
        let plan = plan_depletion(Consumable::Air, &stacks, 6, 3, false).unwrap();
        assert_eq!(
            plan.stacks,
            vec![StackDraw {
                item: ItemId::from("tank"),
                from: 1,
                to: -2
            }]
        );
        assert_eq!(plan.aggregate_to, 3);
        assert_eq!(plan.amount(), 3);
    }

    #[test]
    fn test_carry_spreads_over_stacks() {
        let stacks = [stack("tank", 1), stack("spare", 5)];
        let plan = plan_depletion(Consumable::Air, &stacks, 6, 3, true).unwrap();
        assert_eq!(plan.stacks.len(), 2);
        assert_eq!(plan.stacks[0].to, 0);
        assert_eq!(plan.stacks[1].to, 3);
        assert_eq!(plan.aggregate_to, 3);
    }

    #[test]
    fn test_carry_stops_when_everything_is_gone() {
        let stacks = [stack("tank", 1)];
        let plan = plan_depletion(Consumable::Water, &stacks, 1, 4, true).unwrap();
        assert_eq!(plan.stacks[0].to, 0);
        assert_eq!(plan.amount(), 1);
    }

    #[test]
    fn test_no_qualifying_stack() {
        let stacks = [stack("empty", 0)];
        assert!(plan_depletion(Consumable::Food, &stacks, 2, 1, false).is_none());
        assert!(plan_depletion(Consumable::Food, &[], 2, 1, true).is_none());
    }

    #[test]
    fn test_stacks_skip_inactive_items() {
        let gear = || ItemKind::Gear {
            attributes: Default::default(),
            skills: Default::default(),
        };
        let actor = Actor::new("a1", "Parker", ActorKind::Character(CharacterSheet::default()))
            .with_item(Item::new("i1", "Ration Pack", gear()).with_supply(Consumable::Food, 2))
            .with_item(
                Item::new("i2", "Stored Rations", gear())
                    .with_supply(Consumable::Food, 4)
                    .with_active(false),
            )
            .with_item(Item::new("i3", "Flashlight", gear()).with_supply(Consumable::Power, 3));

        let stacks = supply_stacks(&actor, Consumable::Food);
        assert_eq!(stacks, vec![stack("i1", 2)]);
    }
}
