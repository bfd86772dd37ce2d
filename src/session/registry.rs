//! Session sound registry
//!
//! Owns the id → Sound mapping for one session. Ids are opaque
//! 5-character alphanumeric tokens, generated by rejection sampling
//! against the current key set, never user-supplied. Every creation
//! path in the engine (file load, clone, stimulus generation)
//! terminates in [`SoundRegistry::insert`].

use std::collections::HashMap;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

use crate::error::{Result, SoundlabError};
use crate::session::sound::{Sound, SoundInfo};

/// Length of generated sound ids
pub const ID_LENGTH: usize = 5;

/// Retry cap for id collision sampling. At 62^5 possible tokens a
/// collision streak this long means the id space is effectively full.
const MAX_ID_ATTEMPTS: u32 = 10_000;

/// Suffix appended to the label of cloned sounds
const CLONE_SUFFIX: &str = " (copy)";

/// Registry of the sounds in a session
///
/// The registry is the only shared mutable state in the engine. The
/// execution model is single-threaded and synchronous; a concurrent
/// front-end must serialize mutations behind its own lock.
#[derive(Debug, Default)]
pub struct SoundRegistry {
    sounds: HashMap<String, Sound>,
}

impl SoundRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sounds: HashMap::new(),
        }
    }

    /// Draw a fresh id absent from the current key set
    ///
    /// # Errors
    /// * `RegistryExhausted` - If the collision retry cap is reached
    pub fn generate_id(&self) -> Result<String> {
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(ID_LENGTH)
                .map(char::from)
                .collect();
            if !self.sounds.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(SoundlabError::RegistryExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Insert a sound under a freshly generated id
    ///
    /// # Returns
    /// The id assigned to the sound
    pub fn insert(&mut self, sound: Sound) -> Result<String> {
        let id = self.generate_id()?;
        debug!(id = %id, label = %sound.label, "registry insert");
        self.sounds.insert(id.clone(), sound);
        Ok(id)
    }

    /// Remove a sound
    ///
    /// # Errors
    /// * `NotFound` - If the id is absent
    pub fn remove(&mut self, id: &str) -> Result<Sound> {
        debug!(id = %id, "registry remove");
        self.sounds
            .remove(id)
            .ok_or_else(|| SoundlabError::NotFound { id: id.to_string() })
    }

    /// Remove every sound. Unconditional, so atomic from the caller's
    /// point of view.
    pub fn remove_all(&mut self) {
        debug!(count = self.sounds.len(), "registry clear");
        self.sounds.clear();
    }

    /// Deep-copy a sound under a fresh id
    ///
    /// The copy's label is the source label with " (copy)" appended.
    ///
    /// # Returns
    /// The id of the new sound
    pub fn clone_sound(&mut self, id: &str) -> Result<String> {
        let source = self.get(id)?;
        let mut copy = source.clone();
        copy.label.push_str(CLONE_SUFFIX);
        self.insert(copy)
    }

    /// Change a sound's display label
    pub fn rename(&mut self, id: &str, new_label: impl Into<String>) -> Result<()> {
        let sound = self.get_mut(id)?;
        sound.label = new_label.into();
        Ok(())
    }

    /// Get a sound by id
    pub fn get(&self, id: &str) -> Result<&Sound> {
        self.sounds
            .get(id)
            .ok_or_else(|| SoundlabError::NotFound { id: id.to_string() })
    }

    /// Get a sound by id for in-place mutation
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Sound> {
        self.sounds
            .get_mut(id)
            .ok_or_else(|| SoundlabError::NotFound { id: id.to_string() })
    }

    /// Get several sounds at once, in the order of the requested ids
    ///
    /// # Errors
    /// * `NotFound` - For the first missing id
    pub fn get_many(&self, ids: &[&str]) -> Result<Vec<&Sound>> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Number of sounds in the registry
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Iterate over (id, sound) pairs, unordered
    pub fn sounds(&self) -> impl Iterator<Item = (&str, &Sound)> {
        self.sounds.iter().map(|(id, s)| (id.as_str(), s))
    }

    /// All ids currently in the registry, unordered
    pub fn ids(&self) -> Vec<&str> {
        self.sounds.keys().map(|s| s.as_str()).collect()
    }

    /// Metadata snapshots for every sound, sorted by label for stable
    /// display
    pub fn list(&self) -> Vec<SoundInfo> {
        let mut infos: Vec<SoundInfo> = self
            .sounds
            .iter()
            .map(|(id, sound)| sound.info(id))
            .collect();
        infos.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::sound::ChannelRole;
    use std::collections::HashSet;

    fn test_sound(label: &str) -> Sound {
        Sound::new(label, ChannelRole::Left, vec![0.1, 0.2, 0.3], 48000)
    }

    #[test]
    fn test_ids_are_pairwise_distinct() {
        let mut registry = SoundRegistry::new();
        let mut seen = HashSet::new();
        for i in 0..200 {
            let id = registry.insert(test_sound(&format!("s{}", i))).unwrap();
            assert_eq!(id.len(), ID_LENGTH);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(seen.insert(id), "generated id collided");
        }
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn test_clone_appends_suffix_and_copies_waveform() {
        let mut registry = SoundRegistry::new();
        let id = registry.insert(test_sound("noise")).unwrap();
        let copy_id = registry.clone_sound(&id).unwrap();

        assert_ne!(id, copy_id);
        let copy = registry.get(&copy_id).unwrap();
        assert_eq!(copy.label, "noise (copy)");
        assert_eq!(copy.waveform(), registry.get(&id).unwrap().waveform());
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut registry = SoundRegistry::new();
        let err = registry.remove("zzzzz").unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_remove_all() {
        let mut registry = SoundRegistry::new();
        for i in 0..5 {
            registry.insert(test_sound(&format!("s{}", i))).unwrap();
        }
        registry.remove_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rename() {
        let mut registry = SoundRegistry::new();
        let id = registry.insert(test_sound("old")).unwrap();
        registry.rename(&id, "new").unwrap();
        assert_eq!(registry.get(&id).unwrap().label, "new");

        assert!(registry.rename("zzzzz", "x").is_err());
    }

    #[test]
    fn test_get_many_preserves_order_and_fails_on_missing() {
        let mut registry = SoundRegistry::new();
        let a = registry.insert(test_sound("a")).unwrap();
        let b = registry.insert(test_sound("b")).unwrap();

        let sounds = registry.get_many(&[b.as_str(), a.as_str()]).unwrap();
        assert_eq!(sounds[0].label, "b");
        assert_eq!(sounds[1].label, "a");

        assert!(registry.get_many(&[a.as_str(), "zzzzz"]).is_err());
    }

    #[test]
    fn test_list_is_sorted_by_label() {
        let mut registry = SoundRegistry::new();
        registry.insert(test_sound("beta")).unwrap();
        registry.insert(test_sound("alpha")).unwrap();
        let infos = registry.list();
        assert_eq!(infos[0].label, "alpha");
        assert_eq!(infos[1].label, "beta");
    }
}
