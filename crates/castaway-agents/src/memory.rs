//! Bounded memory log and per-partner conversation history.
//!
//! Both stores evict oldest-first once their configured bound is reached,
//! so an agent's record size stays constant over arbitrarily long runs.

use castaway_types::{Agent, AgentId, ConversationLine, MemoryCategory, MemoryEntry};

/// Importance of a conversation memory.
pub const IMPORTANCE_CONVERSATION: u8 = 3;

/// Importance of a gift given or received.
pub const IMPORTANCE_GIFT: u8 = 5;

/// Importance of a family event (conception, birth).
pub const IMPORTANCE_FAMILY: u8 = 8;

/// Importance of witnessing a death.
pub const IMPORTANCE_DEATH: u8 = 9;

/// Importance of an external message.
pub const IMPORTANCE_GOD: u8 = 10;

/// Upper bound of the importance scale.
const IMPORTANCE_MAX: u8 = 10;

/// Append a memory, evicting the oldest entries beyond `limit`.
///
/// Importance is clamped to `[0, 10]`. A `limit` of zero keeps nothing.
pub fn remember(
    agent: &mut Agent,
    tick: u64,
    category: MemoryCategory,
    description: impl Into<String>,
    importance: u8,
    participants: Vec<AgentId>,
    limit: usize,
) {
    agent.memories.push(MemoryEntry {
        tick,
        category,
        description: description.into(),
        importance: importance.min(IMPORTANCE_MAX),
        participants,
    });
    trim_front(&mut agent.memories, limit);
}

/// Record one line in the agent's conversation with `partner`, evicting
/// the oldest lines beyond `limit`.
pub fn record_line(agent: &mut Agent, partner: AgentId, line: ConversationLine, limit: usize) {
    let history = agent.conversations.entry(partner).or_default();
    history.push(line);
    trim_front(history, limit);
}

/// The `n` most recent memories, oldest first.
pub fn recent(agent: &Agent, n: usize) -> &[MemoryEntry] {
    let start = agent.memories.len().saturating_sub(n);
    agent.memories.get(start..).unwrap_or_default()
}

/// Drop elements from the front until at most `limit` remain.
fn trim_front<T>(items: &mut Vec<T>, limit: usize) {
    let excess = items.len().saturating_sub(limit);
    if excess > 0 {
        items.drain(..excess);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::{Gender, IdMint, Position};

    use super::*;
    use crate::testing;

    #[test]
    fn memory_log_is_bounded_oldest_first() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(1, 1));
        for tick in 0..8 {
            remember(&mut agent, tick, MemoryCategory::Action, "did a thing", 2, Vec::new(), 5);
        }
        assert_eq!(agent.memories.len(), 5);
        assert_eq!(agent.memories.first().unwrap().tick, 3);
        assert_eq!(agent.memories.last().unwrap().tick, 7);
    }

    #[test]
    fn importance_is_clamped() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(1, 1));
        remember(&mut agent, 0, MemoryCategory::God, "hello", 200, Vec::new(), 5);
        assert_eq!(agent.memories.first().unwrap().importance, 10);
    }

    #[test]
    fn conversations_are_bounded_per_partner() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(1, 1));
        let partner: AgentId = mint.mint();
        for tick in 0..12 {
            let line = ConversationLine {
                tick,
                speaker: partner,
                message: format!("line {tick}"),
            };
            record_line(&mut agent, partner, line, 10);
        }
        let history = agent.conversations.get(&partner).unwrap();
        assert_eq!(history.len(), 10);
        assert_eq!(history.first().unwrap().tick, 2);
    }

    #[test]
    fn recent_returns_tail() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(1, 1));
        assert!(recent(&agent, 3).is_empty());
        for tick in 0..5 {
            remember(&mut agent, tick, MemoryCategory::Action, "x", 1, Vec::new(), 50);
        }
        let tail = recent(&agent, 3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.first().unwrap().tick, 2);
    }
}
