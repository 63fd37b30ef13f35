//! Skills and the combat execution sink.
//!
//! Selectors see skills only through the [`Skill`] trait: a name and a
//! cooldown flag. Executing a skill is somebody else's job; the runner just
//! emits a [`SkillRequest`] into a [`CombatSink`] and moves on.

use crate::types::UnitId;

/// A combat action an agent may use.
pub trait Skill {
    fn name(&self) -> &str;
    fn is_on_cooldown(&self) -> bool;
}

impl<S: Skill + ?Sized> Skill for &S {
    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline]
    fn is_on_cooldown(&self) -> bool {
        (**self).is_on_cooldown()
    }
}

/// "Use skill X now" signal sent to the combat subsystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillRequest {
    pub caster: UnitId,
    pub skill: String,
    /// The caster's current target at the time of the request, if any.
    pub target: Option<UnitId>,
}

/// Receives skill requests. Implementations must not block.
pub trait CombatSink {
    fn use_skill(&mut self, request: SkillRequest);
}

impl CombatSink for Vec<SkillRequest> {
    fn use_skill(&mut self, request: SkillRequest) {
        self.push(request);
    }
}

/// Sink that drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl CombatSink for DiscardSink {
    fn use_skill(&mut self, _request: SkillRequest) {}
}

/// A skill with a simple countdown cooldown.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillSlot {
    name: String,
    cooldown: f32,
    remaining: f32,
}

impl SkillSlot {
    /// Creates a ready-to-use skill with the given cooldown in seconds.
    pub fn new(name: impl Into<String>, cooldown: f32) -> Self {
        Self {
            name: name.into(),
            cooldown: cooldown.max(0.0),
            remaining: 0.0,
        }
    }

    /// Builder helper for tests and scripted setups: starts on cooldown.
    #[must_use]
    pub fn cooling_down(mut self, remaining: f32) -> Self {
        self.remaining = remaining.max(0.0);
        self
    }

    /// Puts the skill on its full cooldown.
    pub fn trigger(&mut self) {
        self.remaining = self.cooldown;
    }

    /// Advances the cooldown timer.
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

impl Skill for SkillSlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_on_cooldown(&self) -> bool {
        self.remaining > 0.0
    }
}
