//! Owner keys identifying which logical owner a GUI context belongs to.

use std::fmt;

use crate::error::{ImHostError, Result};

/// Integer index under which a context is registered.
pub type ContextIndex = i32;

/// Context index used by the editor itself.
pub const EDITOR_CONTEXT_INDEX: ContextIndex = 0;

/// Context index used by a standalone game session.
pub const STANDALONE_GAME_CONTEXT_INDEX: ContextIndex = 0;

/// Simulation instance `n` maps to context index `n + SIMULATION_CONTEXT_INDEX_OFFSET`.
pub const SIMULATION_CONTEXT_INDEX_OFFSET: ContextIndex = 1;

/// Editor window slot `n` maps to context index `n + EDITOR_WINDOW_CONTEXT_INDEX_OFFSET`.
pub const EDITOR_WINDOW_CONTEXT_INDEX_OFFSET: ContextIndex = 1024;

/// Number of simulation instances that fit below the editor window range.
#[allow(clippy::cast_sign_loss)]
pub const MAX_SIMULATION_INSTANCES: u32 =
    (EDITOR_WINDOW_CONTEXT_INDEX_OFFSET - SIMULATION_CONTEXT_INDEX_OFFSET) as u32;

/// The logical owner of a GUI context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    /// The editor's own context.
    Editor,
    /// A standalone game session (no editor present).
    Standalone,
    /// A running simulation instance (play-in-editor instance number).
    Simulation(u32),
    /// A dockable editor window slot.
    EditorWindow(u32),
}

impl OwnerKey {
    /// Returns the context index this owner is registered under.
    ///
    /// Simulation indices stay below [`EDITOR_WINDOW_CONTEXT_INDEX_OFFSET`] and
    /// editor window indices stay below `ContextIndex::MAX`, so no two owners
    /// share an index. Owners outside those ranges are rejected.
    pub fn index(&self) -> Result<ContextIndex> {
        let index = match *self {
            OwnerKey::Editor => Some(EDITOR_CONTEXT_INDEX),
            OwnerKey::Standalone => Some(STANDALONE_GAME_CONTEXT_INDEX),
            OwnerKey::Simulation(instance) if instance < MAX_SIMULATION_INSTANCES => {
                SIMULATION_CONTEXT_INDEX_OFFSET.checked_add_unsigned(instance)
            }
            OwnerKey::Simulation(_) => None,
            OwnerKey::EditorWindow(slot) => {
                EDITOR_WINDOW_CONTEXT_INDEX_OFFSET.checked_add_unsigned(slot)
            }
        };
        index.ok_or(ImHostError::OwnerOutOfRange(*self))
    }

    /// Returns the name given to contexts created for this owner.
    #[must_use]
    pub fn context_name(&self) -> String {
        self.to_string()
    }

    /// Returns the simulation instance number, if this owner is a simulation.
    #[must_use]
    pub fn simulation_instance(&self) -> Option<u32> {
        match *self {
            OwnerKey::Simulation(instance) => Some(instance),
            _ => None,
        }
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKey::Editor => write!(f, "Editor"),
            OwnerKey::Standalone => write!(f, "Game"),
            OwnerKey::Simulation(instance) => write!(f, "PIEContext{instance}"),
            OwnerKey::EditorWindow(slot) => write!(f, "EditorWindow{slot}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_indices_are_distinct_across_kinds() {
        assert_eq!(OwnerKey::Editor.index().unwrap(), 0);
        assert_eq!(OwnerKey::Simulation(0).index().unwrap(), 1);
        assert_eq!(OwnerKey::Simulation(3).index().unwrap(), 4);
        assert_eq!(
            OwnerKey::EditorWindow(2).index().unwrap(),
            EDITOR_WINDOW_CONTEXT_INDEX_OFFSET + 2
        );
    }

    #[test]
    fn test_last_simulation_stays_below_editor_windows() {
        let last = OwnerKey::Simulation(MAX_SIMULATION_INSTANCES - 1).index().unwrap();
        assert_eq!(last, EDITOR_WINDOW_CONTEXT_INDEX_OFFSET - 1);
        assert!(last < OwnerKey::EditorWindow(0).index().unwrap());

        assert!(matches!(
            OwnerKey::Simulation(MAX_SIMULATION_INSTANCES).index(),
            Err(ImHostError::OwnerOutOfRange(OwnerKey::Simulation(1023)))
        ));
        assert!(OwnerKey::Simulation(u32::MAX).index().is_err());
    }

    #[test]
    fn test_editor_window_slots_do_not_saturate() {
        let max_slot = u32::try_from(ContextIndex::MAX - EDITOR_WINDOW_CONTEXT_INDEX_OFFSET).unwrap();
        assert_eq!(
            OwnerKey::EditorWindow(max_slot).index().unwrap(),
            ContextIndex::MAX
        );
        assert!(OwnerKey::EditorWindow(max_slot + 1).index().is_err());
        assert!(OwnerKey::EditorWindow(u32::MAX).index().is_err());
    }

    #[test]
    fn test_owner_names() {
        assert_eq!(OwnerKey::Simulation(2).context_name(), "PIEContext2");
        assert_eq!(OwnerKey::EditorWindow(0).context_name(), "EditorWindow0");
        assert_eq!(OwnerKey::Standalone.context_name(), "Game");
    }
}
