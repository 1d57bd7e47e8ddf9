// ─── Rule Evaluation ───
// One evaluator for both library rules and argument rules. The two schemas
// differ only in which predicates are active, which the caller picks through
// `RuleContext`.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::core::platform::Platform;
use crate::core::state::FeatureSet;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    #[serde(default)]
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    /// Version regexes are not evaluated.
    #[allow(dead_code)]
    #[serde(default)]
    pub version: Option<String>,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
            features: None,
        }
    }

    pub fn disallow() -> Self {
        Self {
            action: RuleAction::Disallow,
            ..Self::allow()
        }
    }

    pub fn for_os(mut self, name: &str) -> Self {
        self.os.get_or_insert_with(OsRule::default).name = Some(name.to_string());
        self
    }

    pub fn for_arch(mut self, arch: &str) -> Self {
        self.os.get_or_insert_with(OsRule::default).arch = Some(arch.to_string());
        self
    }

    pub fn with_feature(mut self, name: &str, value: bool) -> Self {
        self.features
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value);
        self
    }
}

/// The predicate set a rule list is evaluated with.
///
/// Library rules check the OS name and architecture. Argument rules check the
/// same plus feature flags, where a feature condition that does not hold
/// vetoes the whole entry. JVM argument rules match a narrower arch set.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    platform: &'a Platform,
    jvm: bool,
    features: Option<&'a FeatureSet>,
}

impl<'a> RuleContext<'a> {
    pub fn library(platform: &'a Platform) -> Self {
        Self {
            platform,
            jvm: false,
            features: None,
        }
    }

    /// Game argument rules.
    pub fn argument(platform: &'a Platform, features: &'a FeatureSet) -> Self {
        Self {
            platform,
            jvm: false,
            features: Some(features),
        }
    }

    pub fn jvm_argument(platform: &'a Platform, features: &'a FeatureSet) -> Self {
        Self {
            platform,
            jvm: true,
            features: Some(features),
        }
    }

    fn os_matches(&self, rule: &Rule) -> bool {
        let Some(os) = &rule.os else {
            return true;
        };

        let name_ok = os
            .name
            .as_deref()
            .map_or(true, |name| self.platform.matches_os(name));
        let arch_ok = os
            .arch
            .as_deref()
            .map_or(true, |arch| {
                if self.jvm {
                    self.platform.matches_jvm_arch(arch)
                } else {
                    self.platform.matches_arch(arch)
                }
            });

        name_ok && arch_ok
    }

    /// `true` when every feature condition of the rule holds. Always `true`
    /// for library rules.
    fn features_match(&self, rule: &Rule) -> bool {
        let (Some(enabled), Some(required)) = (self.features, &rule.features) else {
            return true;
        };

        required
            .iter()
            .all(|(name, expected)| enabled.is_enabled(name) == *expected)
    }
}

/// Decide whether an entity guarded by `rules` applies.
///
/// - No rules (absent or empty) → applicable.
/// - Otherwise start denied and walk the rules in order. A matching `allow`
///   grants; allows are additive.
/// - A matching `disallow` denies and stops evaluation.
/// - An `allow` whose feature conditions do not hold denies and stops.
pub fn is_applicable(rules: Option<&[Rule]>, ctx: &RuleContext<'_>) -> bool {
    let rules = match rules {
        Some(r) if !r.is_empty() => r,
        _ => return true,
    };

    let mut applicable = false;

    for rule in rules {
        match rule.action {
            RuleAction::Allow => {
                if !ctx.features_match(rule) {
                    return false;
                }
                if ctx.os_matches(rule) {
                    applicable = true;
                }
            }
            RuleAction::Disallow => {
                if ctx.os_matches(rule) && ctx.features_match(rule) {
                    return false;
                }
            }
        }
    }

    applicable
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIN: Platform = Platform::WINDOWS_X64;

    fn lib(rules: &[Rule]) -> bool {
        is_applicable(Some(rules), &RuleContext::library(&WIN))
    }

    fn arg(rules: &[Rule], features: &FeatureSet) -> bool {
        is_applicable(Some(rules), &RuleContext::argument(&WIN, features))
    }

    #[test]
    fn absent_or_empty_rules_mean_applicable() {
        assert!(is_applicable(None, &RuleContext::library(&WIN)));
        assert!(lib(&[]));
    }

    #[test]
    fn non_matching_allow_rules_default_to_deny() {
        assert!(!lib(&[Rule::allow().for_os("osx"), Rule::allow().for_os("linux")]));
    }

    #[test]
    fn any_matching_allow_suffices() {
        assert!(lib(&[Rule::allow().for_os("osx"), Rule::allow().for_os("windows")]));
        assert!(lib(&[Rule::allow()]));
    }

    #[test]
    fn later_disallow_vetoes_earlier_allow() {
        assert!(!lib(&[Rule::allow(), Rule::disallow().for_os("windows")]));
    }

    #[test]
    fn disallow_for_other_os_is_ignored() {
        assert!(lib(&[Rule::allow(), Rule::disallow().for_os("osx")]));
    }

    #[test]
    fn unconditional_disallow_short_circuits() {
        assert!(!lib(&[Rule::disallow(), Rule::allow()]));
    }

    #[test]
    fn arch_conditions_match_the_platform_set() {
        assert!(lib(&[Rule::allow().for_arch("x86")]));
        assert!(!lib(&[Rule::allow().for_arch("arm64")]));
    }

    #[test]
    fn jvm_argument_rules_only_match_the_native_arch() {
        let features = FeatureSet::new();
        let jvm = RuleContext::jvm_argument(&WIN, &features);
        assert!(!is_applicable(Some(&[Rule::allow().for_arch("x86")]), &jvm));
        assert!(is_applicable(Some(&[Rule::allow().for_arch("x64")]), &jvm));
        assert!(arg(&[Rule::allow().for_arch("x86")], &features));
    }

    #[test]
    fn true_feature_is_a_hard_veto_for_arguments() {
        let none = FeatureSet::new();
        let rules = [
            Rule::allow().for_os("windows"),
            Rule::allow().with_feature("is_quick_play_singleplayer", true),
        ];
        assert!(!arg(&rules, &none));
        assert!(!arg(&[Rule::allow().with_feature("has_custom_resolution", true)], &none));
    }

    #[test]
    fn enabled_feature_lets_the_argument_through() {
        let features = FeatureSet::new().enable("has_custom_resolution");
        assert!(arg(
            &[Rule::allow().with_feature("has_custom_resolution", true)],
            &features
        ));
    }

    #[test]
    fn library_rules_ignore_features() {
        assert!(lib(&[Rule::allow().with_feature("is_demo_user", true)]));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let rules = [
            Rule::allow(),
            Rule::disallow().for_os("osx"),
            Rule::allow().for_arch("x86"),
        ];
        let first = lib(&rules);
        for _ in 0..16 {
            assert_eq!(lib(&rules), first);
        }
    }

    #[test]
    fn deserializes_mojang_rule_shape() {
        let rules: Vec<Rule> = serde_json::from_value(serde_json::json!([
            {"action": "allow"},
            {"action": "disallow", "os": {"name": "osx"}},
            {"action": "allow", "features": {"has_custom_resolution": true}}
        ]))
        .unwrap();
        assert_eq!(rules[0], Rule::allow());
        assert_eq!(rules[1], Rule::disallow().for_os("osx"));
        assert_eq!(rules[2], Rule::allow().with_feature("has_custom_resolution", true));
    }
}
