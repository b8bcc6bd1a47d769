//! Registry of providers with a single active game

use super::{BoxedProvider, CapabilityProvider, GameSlot};

/// Holds one provider per game and keeps at most one of them enabled
pub struct ActiveGameRegistry {
    /// Kept in `GameSlot::GAMES` order so scans honour precedence
    providers: Vec<(GameSlot, BoxedProvider)>,
    active: GameSlot,
}

impl ActiveGameRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            active: GameSlot::None,
        }
    }

    /// Register the provider for a game, replacing any previous one
    pub fn register(&mut self, slot: GameSlot, provider: BoxedProvider) {
        if slot == GameSlot::None {
            log::warn!("Ignoring provider registered for GameSlot::None");
            return;
        }

        self.providers.retain(|(s, _)| *s != slot);
        let pos = self
            .providers
            .iter()
            .position(|(s, _)| s.index() > slot.index())
            .unwrap_or(self.providers.len());
        self.providers.insert(pos, (slot, provider));
        log::debug!("Registered provider for {}", slot);
    }

    /// Builder-style registration
    pub fn with_provider(mut self, slot: GameSlot, provider: impl CapabilityProvider + 'static) -> Self {
        self.register(slot, Box::new(provider));
        self
    }

    /// Engage `slot` and disengage every other provider.
    ///
    /// Disables run before the enable; providers already in the requested
    /// state are not touched. Returns whether the active slot changed.
    pub fn set_active(&mut self, slot: GameSlot) -> bool {
        for (s, provider) in self.providers.iter_mut() {
            if *s != slot && provider.enabled() {
                provider.set_enabled(false);
            }
        }

        if let Some(provider) = self.provider_mut(slot) {
            if !provider.enabled() {
                provider.set_enabled(true);
            }
        } else if slot != GameSlot::None {
            log::warn!("No provider registered for {}", slot);
        }

        let changed = self.active != slot;
        if changed {
            log::info!("Active game: {} -> {}", self.active, slot);
            self.active = slot;
        }
        changed
    }

    /// Currently engaged slot
    pub fn active(&self) -> GameSlot {
        self.active
    }

    /// First provider reporting enabled, in precedence order
    pub fn resolve_enabled(&self) -> GameSlot {
        self.providers
            .iter()
            .find(|(_, p)| p.enabled())
            .map_or(GameSlot::None, |(s, _)| *s)
    }

    pub fn provider(&self, slot: GameSlot) -> Option<&dyn CapabilityProvider> {
        self.providers
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, p)| p.as_ref())
    }

    pub fn provider_mut(&mut self, slot: GameSlot) -> Option<&mut (dyn CapabilityProvider + 'static)> {
        self.providers
            .iter_mut()
            .find(|(s, _)| *s == slot)
            .map(|(_, p)| p.as_mut())
    }

    /// Provider of the active game
    pub fn active_provider(&self) -> Option<&dyn CapabilityProvider> {
        self.provider(self.active)
    }

    /// Whether the active game's session is live. Always false for `None`.
    pub fn game_on(&self) -> bool {
        self.active_provider().is_some_and(|p| p.is_attached())
    }

    /// Clear split progress on every provider
    pub fn reset_split_flags(&mut self) {
        for (_, provider) in self.providers.iter_mut() {
            provider.reset_split_flags();
        }
    }

    /// Registered slots in precedence order
    pub fn slots(&self) -> Vec<GameSlot> {
        self.providers.iter().map(|(s, _)| *s).collect()
    }
}

impl Default for ActiveGameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
