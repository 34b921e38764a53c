//! Navigation gate: which screen set a client session may see.
//!
//! The session's flags are folded into a single [`GateState`] once per change.
//! Precedence lives in [`GateState::from_inputs`] and nowhere else.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Presence flag persisted on the client device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    TrialStarted,
    SubscriptionSelected,
    OnboardingCompleted,
}

impl Marker {
    pub const ALL: [Marker; 3] = [
        Marker::TrialStarted,
        Marker::SubscriptionSelected,
        Marker::OnboardingCompleted,
    ];

    /// Storage key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::TrialStarted => "trial_started",
            Self::SubscriptionSelected => "subscription_selected",
            Self::OnboardingCompleted => "onboarding_completed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "trial_started" => Some(Self::TrialStarted),
            "subscription_selected" => Some(Self::SubscriptionSelected),
            "onboarding_completed" => Some(Self::OnboardingCompleted),
            _ => None,
        }
    }
}

/// The set of markers currently present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    present: BTreeSet<Marker>,
}

impl MarkerSnapshot {
    pub fn new(markers: impl IntoIterator<Item = Marker>) -> Self {
        Self {
            present: markers.into_iter().collect(),
        }
    }

    pub fn contains(&self, marker: Marker) -> bool {
        self.present.contains(&marker)
    }

    pub fn with(mut self, marker: Marker) -> Self {
        self.present.insert(marker);
        self
    }

    pub fn without(mut self, marker: Marker) -> Self {
        self.present.remove(&marker);
        self
    }

    /// Trial started or a plan was picked.
    pub fn has_subscription(&self) -> bool {
        self.contains(Marker::TrialStarted) || self.contains(Marker::SubscriptionSelected)
    }

    /// A fresh client with neither trial nor subscription marker gets a trial.
    pub fn needs_trial_bootstrap(&self) -> bool {
        !self.has_subscription()
    }

    pub fn iter(&self) -> impl Iterator<Item = Marker> + '_ {
        self.present.iter().copied()
    }
}

/// Authentication resolution as reported by the identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl AuthStatus {
    pub const RESOLVING: AuthStatus = AuthStatus {
        is_loading: true,
        is_authenticated: false,
    };

    pub fn resolved(is_authenticated: bool) -> Self {
        Self {
            is_loading: false,
            is_authenticated,
        }
    }
}

/// The four flags the gate decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateInputs {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub has_subscription: bool,
    pub onboarding_pending: bool,
}

impl GateInputs {
    /// Derive the inputs from auth resolution and the persisted markers.
    ///
    /// Onboarding is pending only once auth has resolved to a signed-in user
    /// who has not completed it.
    pub fn from_session(auth: AuthStatus, markers: &MarkerSnapshot) -> Self {
        Self {
            is_loading: auth.is_loading,
            is_authenticated: auth.is_authenticated,
            has_subscription: markers.has_subscription(),
            onboarding_pending: auth.is_authenticated
                && !auth.is_loading
                && !markers.contains(Marker::OnboardingCompleted),
        }
    }
}

/// Screen group a state exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenSet {
    LandingOnly,
    FullApp,
    OnboardingOnly,
}

/// Explicit session state driving navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Auth unresolved, no trial or subscription.
    Loading,
    /// Signed out, no trial or subscription.
    Unauthenticated,
    /// Trial or subscription present while signed out or still resolving.
    TrialActive,
    /// Signed in, onboarding not completed.
    AuthenticatedOnboarding,
    /// Signed in and onboarded.
    AuthenticatedActive,
}

impl GateState {
    /// First matching row wins. Total over every input combination.
    pub fn from_inputs(inputs: GateInputs) -> Self {
        let GateInputs {
            is_loading,
            is_authenticated,
            has_subscription,
            onboarding_pending,
        } = inputs;

        if is_loading && !has_subscription {
            Self::Loading
        } else if !is_authenticated && !has_subscription {
            Self::Unauthenticated
        } else if (!is_authenticated && has_subscription) || (is_loading && has_subscription) {
            Self::TrialActive
        } else if onboarding_pending {
            Self::AuthenticatedOnboarding
        } else {
            Self::AuthenticatedActive
        }
    }

    pub fn screen_set(&self) -> ScreenSet {
        match self {
            Self::Loading | Self::Unauthenticated => ScreenSet::LandingOnly,
            Self::TrialActive | Self::AuthenticatedActive => ScreenSet::FullApp,
            Self::AuthenticatedOnboarding => ScreenSet::OnboardingOnly,
        }
    }

    /// Whether unmatched paths fall back to the not-found screen.
    pub fn has_catch_all(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}
