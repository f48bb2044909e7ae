//! Machine configuration and its builder.
//!
//! A [`MachineConfiguration`] is the fully validated set of parts a machine
//! is assembled from. It can only be obtained through [`ConfigBuilder`] (or
//! from persisted state, which goes through the same builder), so every
//! structural error surfaces before a single symbol is processed.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::WiringCatalog;
use crate::error::{BitnigmaError, Result};
use crate::mode::{FixedPointPolicy, Mode};
use crate::rotor::{RotorInstance, RotorSetting};
use crate::store::MachineState;
use crate::wiring::{parse_letter_pair, Plugboard, ReflectorWiring};

/// Validated machine parts: mode, rotors (left to right), reflector and
/// plugboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfiguration {
    mode: Mode,
    reflector_policy: FixedPointPolicy,
    rotors: Vec<RotorInstance>,
    reflector: Arc<ReflectorWiring>,
    plugboard: Plugboard,
}

impl MachineConfiguration {
    /// Starts a builder for `mode`.
    pub fn builder(mode: Mode) -> ConfigBuilder {
        ConfigBuilder::new(mode)
    }

    /// Assembles a configuration from already constructed parts.
    ///
    /// # Errors
    /// - [`BitnigmaError::IncompleteConfiguration`] if `rotors` is empty.
    /// - [`BitnigmaError::IncompatibleWiring`] if any part's alphabet size
    ///   differs from the mode's.
    /// - [`BitnigmaError::InvalidReflector`] if the reflector breaks
    ///   `reflector_policy`.
    pub fn new(
        mode: Mode,
        reflector_policy: FixedPointPolicy,
        rotors: Vec<RotorInstance>,
        reflector: Arc<ReflectorWiring>,
        plugboard: Plugboard,
    ) -> Result<Self> {
        if rotors.is_empty() {
            return Err(BitnigmaError::IncompleteConfiguration {
                reason: "at least one rotor is required".to_string(),
            });
        }
        for rotor in &rotors {
            check_size(mode, rotor.name(), rotor.alphabet_size())?;
        }
        check_size(mode, reflector.name(), reflector.alphabet_size())?;
        check_size(mode, "plugboard", plugboard.alphabet_size())?;
        reflector.check_policy(reflector_policy)?;
        Ok(MachineConfiguration {
            mode,
            reflector_policy,
            rotors,
            reflector,
            plugboard,
        })
    }

    /// Operating mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Reflector fixed-point policy the configuration was validated with.
    pub fn reflector_policy(&self) -> FixedPointPolicy {
        self.reflector_policy
    }

    /// Rotors, left to right.
    pub fn rotors(&self) -> &[RotorInstance] {
        &self.rotors
    }

    /// The reflector.
    pub fn reflector(&self) -> &Arc<ReflectorWiring> {
        &self.reflector
    }

    /// The plugboard.
    pub fn plugboard(&self) -> &Plugboard {
        &self.plugboard
    }

    /// Rotor positions, left to right.
    pub fn positions(&self) -> Vec<usize> {
        self.rotors.iter().map(RotorInstance::position).collect()
    }

    /// The serializable description of this configuration.
    pub fn to_state(&self) -> MachineState {
        let mut state = MachineState::new(
            self.mode,
            self.rotors.iter().map(RotorInstance::setting).collect(),
            self.reflector.name().to_string(),
            self.plugboard.pairs().to_vec(),
        );
        if self.reflector_policy != self.mode.default_reflector_policy() {
            state.reflector_policy = Some(self.reflector_policy);
        }
        state
    }

    pub(crate) fn rotors_mut(&mut self) -> &mut [RotorInstance] {
        &mut self.rotors
    }
}

/// Fails with `IncompatibleWiring` unless `found` matches the mode.
fn check_size(mode: Mode, name: &str, found: usize) -> Result<()> {
    let expected = mode.alphabet_size();
    if found != expected {
        return Err(BitnigmaError::IncompatibleWiring {
            name: name.to_string(),
            mode,
            expected,
            found,
        });
    }
    Ok(())
}

/// Collects settings by name and resolves them against a catalog.
///
/// # Examples
///
/// ```
/// use bitnigma::{ConfigBuilder, Mode, RotorSetting, WiringCatalog};
///
/// let catalog = WiringCatalog::historical().unwrap();
/// let config = ConfigBuilder::new(Mode::Classic)
///     .rotor(RotorSetting::new("enig1"))
///     .rotor(RotorSetting::new("enig2"))
///     .rotor(RotorSetting::new("enig3"))
///     .reflector("ref-b")
///     .plug(0, 1)
///     .build(&catalog)
///     .unwrap();
/// assert_eq!(config.rotors().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBuilder {
    mode: Mode,
    reflector_policy: Option<FixedPointPolicy>,
    rotors: Vec<RotorSetting>,
    reflector: Option<String>,
    plugboard: Vec<(usize, usize)>,
}

impl ConfigBuilder {
    /// Starts an empty builder for `mode`.
    pub fn new(mode: Mode) -> Self {
        ConfigBuilder {
            mode,
            reflector_policy: None,
            rotors: Vec::new(),
            reflector: None,
            plugboard: Vec::new(),
        }
    }

    /// Starts a builder holding everything recorded in `state`.
    pub fn from_state(state: &MachineState) -> Self {
        ConfigBuilder {
            mode: state.mode,
            reflector_policy: state.reflector_policy,
            rotors: state.rotors.clone(),
            reflector: Some(state.reflector.clone()),
            plugboard: state.plugboard.clone(),
        }
    }

    /// Appends a rotor to the right of those already added.
    pub fn rotor(mut self, setting: RotorSetting) -> Self {
        self.rotors.push(setting);
        self
    }

    /// Appends several rotors, left to right.
    pub fn rotors(mut self, settings: impl IntoIterator<Item = RotorSetting>) -> Self {
        self.rotors.extend(settings);
        self
    }

    /// Appends a rotor given in `name[:ring[:notches[:position]]]` form.
    pub fn rotor_str(self, setting: &str) -> Result<Self> {
        Ok(self.rotor(setting.parse()?))
    }

    /// Selects the reflector by short name.
    pub fn reflector(mut self, name: impl Into<String>) -> Self {
        self.reflector = Some(name.into());
        self
    }

    /// Adds a plugboard cable between two symbols.
    pub fn plug(mut self, a: usize, b: usize) -> Self {
        self.plugboard.push((a, b));
        self
    }

    /// Adds plugboard cables given as two-letter pairs, e.g. `"AB"`.
    pub fn plug_letters<S: AsRef<str>>(mut self, pairs: &[S]) -> Result<Self> {
        for pair in pairs {
            self.plugboard.push(parse_letter_pair(pair.as_ref())?);
        }
        Ok(self)
    }

    /// Overrides the mode's default reflector fixed-point policy.
    pub fn reflector_policy(mut self, policy: FixedPointPolicy) -> Self {
        self.reflector_policy = Some(policy);
        self
    }

    /// Resolves every name against `catalog` and validates the result.
    ///
    /// # Errors
    /// Any validation error of the rotors, reflector, plugboard or mode;
    /// see [`MachineConfiguration::new`], [`RotorInstance::new`] and
    /// [`Plugboard::new`].
    pub fn build(&self, catalog: &WiringCatalog) -> Result<MachineConfiguration> {
        let size = self.mode.alphabet_size();
        let reflector_name =
            self.reflector
                .as_deref()
                .ok_or_else(|| BitnigmaError::IncompleteConfiguration {
                    reason: "no reflector selected".to_string(),
                })?;

        let mut rotors = Vec::with_capacity(self.rotors.len());
        for setting in &self.rotors {
            let wiring = catalog.rotor(&setting.name)?;
            // Size first, so range errors are reported against the right alphabet.
            check_size(self.mode, wiring.name(), wiring.alphabet_size())?;
            rotors.push(RotorInstance::new(
                wiring,
                setting.ring,
                setting.position,
                setting.notches.clone(),
            )?);
        }

        let reflector = catalog.reflector(reflector_name)?;
        check_size(self.mode, reflector.name(), reflector.alphabet_size())?;
        let plugboard = Plugboard::new(&self.plugboard, size)?;
        let policy = self
            .reflector_policy
            .unwrap_or_else(|| self.mode.default_reflector_policy());

        let config = MachineConfiguration::new(self.mode, policy, rotors, reflector, plugboard)?;
        debug!(
            mode = %config.mode,
            rotors = ?config.rotors.iter().map(|r| r.name()).collect::<Vec<_>>(),
            reflector = config.reflector.name(),
            plugs = config.plugboard.pairs().len(),
            "machine configuration built"
        );
        Ok(config)
    }
}
