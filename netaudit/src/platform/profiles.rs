//! Command profiles keyed by platform family.
//!
//! Adding support for a new platform is a data-table change: register a
//! profile listing the commands to run and the parser for each. Unknown
//! platforms resolve to a minimal fallback profile instead of failing.

use indexmap::IndexMap;

use super::{PlatformFamily, PlatformInfo};
use crate::error::Error;
use crate::parse::ParserId;

/// One step of a profile: a command and the parser for its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// The CLI command to send.
    pub command: String,

    /// Parser applied to the command's output.
    pub parser: ParserId,
}

impl ProfileEntry {
    pub fn new(command: impl Into<String>, parser: ParserId) -> Self {
        Self {
            command: command.into(),
            parser,
        }
    }
}

/// Ordered list of diagnostic commands for one platform family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandProfile {
    entries: Vec<ProfileEntry>,
}

impl CommandProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to the profile.
    pub fn with_command(mut self, command: impl Into<String>, parser: ParserId) -> Self {
        self.entries.push(ProfileEntry::new(command, parser));
        self
    }

    /// The profile's entries, in execution order.
    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry mapping platform family to command profile.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: IndexMap<PlatformFamily, CommandProfile>,
    fallback: CommandProfile,
}

impl ProfileRegistry {
    /// Create an empty registry with only the fallback profile.
    pub fn new() -> Self {
        Self {
            profiles: IndexMap::new(),
            fallback: CommandProfile::new().with_command("show version", ParserId::Version),
        }
    }

    /// Create the registry with built-in profiles for all known families.
    ///
    /// ASA gets no CDP command; it has no comparable neighbor discovery.
    pub fn builtin() -> Self {
        let ios = CommandProfile::new()
            .with_command("show version", ParserId::Version)
            .with_command("show ip interface brief", ParserId::Interfaces)
            .with_command("show cdp neighbors detail", ParserId::Neighbors);

        let nxos = CommandProfile::new()
            .with_command("show version", ParserId::Version)
            .with_command("show ip interface brief", ParserId::Interfaces)
            .with_command("show cdp neighbors detail", ParserId::Neighbors);

        let asa = CommandProfile::new()
            .with_command("show version", ParserId::Version)
            .with_command("show interface ip brief", ParserId::Interfaces);

        let mut registry = Self::new();
        registry.profiles.insert(PlatformFamily::Ios, ios.clone());
        registry.profiles.insert(PlatformFamily::IosXe, ios);
        registry.profiles.insert(PlatformFamily::Nxos, nxos);
        registry.profiles.insert(PlatformFamily::Asa, asa);
        registry
    }

    /// Register a profile for a family.
    ///
    /// Errors if the family already has one; built-in entries are not
    /// silently replaced.
    pub fn register(
        &mut self,
        family: PlatformFamily,
        profile: CommandProfile,
    ) -> Result<(), Error> {
        if self.profiles.contains_key(&family) {
            return Err(Error::InvalidConfig {
                message: format!("profile for {} already registered", family),
            });
        }
        self.profiles.insert(family, profile);
        Ok(())
    }

    /// Look up the profile for a detected platform.
    ///
    /// Families with no registered profile (including `Unknown`) get the
    /// fallback profile.
    pub fn resolve(&self, platform: &PlatformInfo) -> &CommandProfile {
        self.profiles.get(&platform.family).unwrap_or(&self.fallback)
    }

    /// Registered families, in registration order.
    pub fn families(&self) -> impl Iterator<Item = &PlatformFamily> {
        self.profiles.keys()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let registry = ProfileRegistry::builtin();

        let ios = registry.resolve(&PlatformInfo::new(PlatformFamily::Ios, "15.2"));
        assert_eq!(ios.len(), 3);
        assert_eq!(ios.entries()[0].command, "show version");
        assert_eq!(ios.entries()[2].parser, ParserId::Neighbors);

        // ASA has no CDP step
        let asa = registry.resolve(&PlatformInfo::new(PlatformFamily::Asa, "9.12"));
        assert_eq!(asa.len(), 2);
        assert!(asa.entries().iter().all(|e| e.parser != ParserId::Neighbors));
        assert_eq!(asa.entries()[1].command, "show interface ip brief");
    }

    #[test]
    fn test_unknown_resolves_to_fallback() {
        let registry = ProfileRegistry::builtin();
        let profile = registry.resolve(&PlatformInfo::unknown());
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.entries()[0].parser, ParserId::Version);
    }

    #[test]
    fn test_register_is_additive() {
        let mut registry = ProfileRegistry::new();
        let profile = CommandProfile::new().with_command("show version", ParserId::Version);

        registry
            .register(PlatformFamily::Ios, profile.clone())
            .unwrap();
        assert!(registry.register(PlatformFamily::Ios, profile).is_err());

        let resolved = registry.resolve(&PlatformInfo::new(PlatformFamily::Ios, ""));
        assert_eq!(resolved.len(), 1);
    }
}
