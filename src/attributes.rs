//! Named per-element vector channels.
//!
//! An [`AttributeStore`] keeps an ordered list of channels. Each channel
//! has a prototype vector, which fixes its dimension and is the value new
//! members start with, and a column of values keyed by element handle.
//! The store also tracks its member set; every member has a value in
//! every channel, and every lookup outside that set fails with a typed
//! error instead of producing a default.

use slotmap::{Key, SecondaryMap};

use crate::error::AttributeError;
use crate::math::VectorN;

#[derive(Debug, Clone)]
struct Channel<K: Key> {
    name: String,
    prototype: VectorN,
    values: SecondaryMap<K, VectorN>,
}

/// Columnar store of fixed-dimension vectors keyed by element handle.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore<K: Key> {
    channels: Vec<Channel<K>>,
    members: SecondaryMap<K, ()>,
}

impl<K: Key> AttributeStore<K> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            members: SecondaryMap::new(),
        }
    }

    /// Creates an empty store with one declared channel.
    #[must_use]
    pub fn with_channel(name: &str, prototype: VectorN) -> Self {
        Self {
            channels: vec![Channel {
                name: name.to_owned(),
                prototype,
                values: SecondaryMap::new(),
            }],
            members: SecondaryMap::new(),
        }
    }

    // --- Channels ---

    /// Declares a channel. Current members receive a copy of `prototype`.
    ///
    /// Re-declaring a channel with the same dimension replaces its
    /// prototype and keeps the stored values.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::DimensionMismatch`] if the channel exists
    /// with a different dimension.
    pub fn add(&mut self, name: &str, prototype: VectorN) -> Result<(), AttributeError> {
        if let Some(channel) = self.channel_mut(name) {
            if channel.prototype.len() != prototype.len() {
                return Err(AttributeError::DimensionMismatch {
                    name: name.to_owned(),
                    expected: channel.prototype.len(),
                    found: prototype.len(),
                });
            }
            channel.prototype = prototype;
            return Ok(());
        }

        let mut values = SecondaryMap::new();
        for key in self.members.keys() {
            values.insert(key, prototype.clone());
        }
        self.channels.push(Channel {
            name: name.to_owned(),
            prototype,
            values,
        });
        Ok(())
    }

    /// Removes a channel from every member. Returns `false` if it was not
    /// declared.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.channels.len();
        self.channels.retain(|c| c.name != name);
        self.channels.len() != before
    }

    /// Returns `true` if the channel is declared.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.channel(name).is_ok()
    }

    /// Dimension of a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not declared.
    pub fn dim(&self, name: &str) -> Result<usize, AttributeError> {
        Ok(self.channel(name)?.prototype.len())
    }

    /// Prototype of a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not declared.
    pub fn prototype(&self, name: &str) -> Result<&VectorN, AttributeError> {
        Ok(&self.channel(name)?.prototype)
    }

    /// Channel names in declaration order.
    #[must_use]
    pub fn attrs(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of declared channels.
    #[must_use]
    pub fn num_attrs(&self) -> usize {
        self.channels.len()
    }

    /// Declares `to` with the prototype of `from` and copies every value.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is missing or `to` exists with another
    /// dimension.
    pub fn copy_channel(&mut self, from: &str, to: &str) -> Result<(), AttributeError> {
        if from == to {
            return self.channel(from).map(|_| ());
        }
        let source = self.channel(from)?.clone();
        self.add(to, source.prototype)?;
        if let Some(target) = self.channel_mut(to) {
            target.values = source.values;
        }
        Ok(())
    }

    /// Renames a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is missing or `to` is already declared.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), AttributeError> {
        if from != to && self.has(to) {
            return Err(AttributeError::DuplicateChannel(to.to_owned()));
        }
        let channel = self
            .channel_mut(from)
            .ok_or_else(|| AttributeError::MissingChannel(from.to_owned()))?;
        to.clone_into(&mut channel.name);
        Ok(())
    }

    /// Resets every value of a channel to its prototype.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not declared.
    pub fn clear(&mut self, name: &str) -> Result<(), AttributeError> {
        let channel = self
            .channel_mut(name)
            .ok_or_else(|| AttributeError::MissingChannel(name.to_owned()))?;
        let prototype = channel.prototype.clone();
        for (_, value) in &mut channel.values {
            value.copy_from(&prototype);
        }
        Ok(())
    }

    /// Sets every member's value of a channel, declaring the channel with a
    /// zero prototype if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel exists with another dimension.
    pub fn set_all(&mut self, name: &str, value: &VectorN) -> Result<(), AttributeError> {
        if !self.has(name) {
            self.add(name, VectorN::zeros(value.len()))?;
        }
        let channel = self
            .channel_mut(name)
            .ok_or_else(|| AttributeError::MissingChannel(name.to_owned()))?;
        check_dim(channel, value)?;
        for (_, stored) in &mut channel.values {
            stored.copy_from(value);
        }
        Ok(())
    }

    /// Iterates `(key, value)` pairs of a channel in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not declared.
    pub fn values(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = (K, &VectorN)> + '_, AttributeError> {
        Ok(self.channel(name)?.values.iter())
    }

    // --- Members ---

    /// Registers a key, giving it every channel's prototype. Registering a
    /// member again leaves its values untouched.
    pub fn insert_key(&mut self, key: K) {
        if self.members.contains_key(key) {
            return;
        }
        self.members.insert(key, ());
        for channel in &mut self.channels {
            channel.values.insert(key, channel.prototype.clone());
        }
    }

    /// Removes a key from every channel. Returns `false` if it was not a
    /// member.
    pub fn remove_key(&mut self, key: K) -> bool {
        if self.members.remove(key).is_none() {
            return false;
        }
        for channel in &mut self.channels {
            channel.values.remove(key);
        }
        true
    }

    /// Returns `true` if the key is a member.
    #[must_use]
    pub fn contains_key(&self, key: K) -> bool {
        self.members.contains_key(key)
    }

    /// Iterates members in key order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.members.keys()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    // --- Values ---

    /// Returns the value of `key` in channel `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not declared or the key is not a
    /// member.
    pub fn get(&self, key: K, name: &str) -> Result<&VectorN, AttributeError> {
        self.channel(name)?
            .values
            .get(key)
            .ok_or_else(|| AttributeError::MissingKey(name.to_owned()))
    }

    /// Returns the first component of `key`'s value in channel `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the channel is
    /// zero-dimensional.
    pub fn scalar(&self, key: K, name: &str) -> Result<f64, AttributeError> {
        let value = self.get(key, name)?;
        value
            .iter()
            .next()
            .copied()
            .ok_or_else(|| AttributeError::DimensionMismatch {
                name: name.to_owned(),
                expected: 1,
                found: 0,
            })
    }

    /// Overwrites the value of `key` in channel `name`.
    ///
    /// # Errors
    ///
    /// Returns an error, writing nothing, if the channel is not declared,
    /// the key is not a member, or `value` has the wrong dimension.
    pub fn set(&mut self, key: K, name: &str, value: &VectorN) -> Result<(), AttributeError> {
        let channel = self
            .channel_mut(name)
            .ok_or_else(|| AttributeError::MissingChannel(name.to_owned()))?;
        check_dim(channel, value)?;
        let stored = channel
            .values
            .get_mut(key)
            .ok_or_else(|| AttributeError::MissingKey(name.to_owned()))?;
        stored.copy_from(value);
        Ok(())
    }

    fn channel(&self, name: &str) -> Result<&Channel<K>, AttributeError> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AttributeError::MissingChannel(name.to_owned()))
    }

    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel<K>> {
        self.channels.iter_mut().find(|c| c.name == name)
    }
}

fn check_dim<K: Key>(channel: &Channel<K>, value: &VectorN) -> Result<(), AttributeError> {
    if channel.prototype.len() == value.len() {
        Ok(())
    } else {
        Err(AttributeError::DimensionMismatch {
            name: channel.name.clone(),
            expected: channel.prototype.len(),
            found: value.len(),
        })
    }
}
