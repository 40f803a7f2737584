use crate::common::{Atom, ObjectIdx, VariableIdx};
use crate::problem::{Condition, Effect, Formula, ProblemBuilder, ProblemContext, SymbolKind};

use anyhow::{anyhow, bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;

/// Largest number of values a `{ min, max }` domain may span.
pub const MAX_RANGE_LEN: i64 = 1 << 16;

/// A value as written in a problem file: a boolean, an integer or an object name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueYaml {
    Bool(bool),
    Int(ObjectIdx),
    Name(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolYaml {
    pub name: String,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainYaml {
    Values(Vec<ValueYaml>),
    Range { min: ObjectIdx, max: ObjectIdx },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableYaml {
    pub symbol: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Defaults to `[false, true]` for predicates.
    pub domain: Option<DomainYaml>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtomYaml {
    pub var: String,
    pub eq: ValueYaml,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotEqualsYaml {
    pub var: String,
    pub ne: ValueYaml,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnyOfYaml {
    pub any: Vec<AtomYaml>,
}

/// Each shape rejects unknown keys, so a mapping mixing `eq` and `ne`
/// matches none of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionYaml {
    Equals(AtomYaml),
    NotEquals(NotEqualsYaml),
    AnyOf(AnyOfYaml),
}

/// Exactly one of `set`, `copy` and `add` must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectYaml {
    pub var: String,
    #[serde(default)]
    pub when: Vec<ConditionYaml>,
    pub set: Option<ValueYaml>,
    pub copy: Option<String>,
    pub add: Option<ObjectIdx>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionYaml {
    pub name: String,
    #[serde(default)]
    pub pre: Vec<ConditionYaml>,
    pub effects: Vec<EffectYaml>,
}

/// A grounded problem file.
///
/// Variables are referred to by their canonical name `symbol(arg,...)`, or
/// just `symbol` when nullary. Predicates missing from `init` start false.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemYaml {
    #[serde(default)]
    pub objects: Vec<String>,
    pub symbols: Vec<SymbolYaml>,
    pub variables: Vec<VariableYaml>,
    #[serde(default)]
    pub init: BTreeMap<String, ValueYaml>,
    #[serde(default)]
    pub actions: Vec<ActionYaml>,
    pub goal: Vec<ConditionYaml>,
}

/// Name lookups shared by every part of the file.
struct Scope {
    objects: HashMap<String, ObjectIdx>,
    variables: HashMap<String, VariableIdx>,
}

impl Scope {
    fn variable(&self, name: &str) -> anyhow::Result<VariableIdx> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown variable {name}"))
    }

    fn value(&self, value: &ValueYaml) -> anyhow::Result<ObjectIdx> {
        match value {
            ValueYaml::Bool(value) => Ok(ObjectIdx::from(*value)),
            ValueYaml::Int(value) => Ok(*value),
            ValueYaml::Name(name) => self
                .objects
                .get(name)
                .copied()
                .ok_or_else(|| anyhow!("unknown object {name}")),
        }
    }

    fn atom(&self, var: &str, value: &ValueYaml) -> anyhow::Result<Atom> {
        Ok(Atom::new(self.variable(var)?, self.value(value)?))
    }

    fn condition(&self, condition: &ConditionYaml) -> anyhow::Result<Condition> {
        Ok(match condition {
            ConditionYaml::Equals(AtomYaml { var, eq }) => Condition::Equals(self.atom(var, eq)?),
            ConditionYaml::NotEquals(NotEqualsYaml { var, ne }) => Condition::NotEquals(self.atom(var, ne)?),
            ConditionYaml::AnyOf(AnyOfYaml { any }) => Condition::AnyOf(
                any.iter()
                    .map(|atom| self.atom(&atom.var, &atom.eq))
                    .collect::<anyhow::Result<_>>()?,
            ),
        })
    }

    fn conditions(&self, conditions: &[ConditionYaml]) -> anyhow::Result<Vec<Condition>> {
        conditions.iter().map(|condition| self.condition(condition)).collect()
    }

    fn effect(&self, effect: &EffectYaml) -> anyhow::Result<Effect> {
        let variable = self.variable(&effect.var)?;
        let built = match (&effect.set, &effect.copy, effect.add) {
            (Some(value), None, None) => Effect::assign(variable, self.value(value)?),
            (None, Some(source), None) => Effect::copy(variable, self.variable(source)?),
            (None, None, Some(delta)) => Effect::offset(variable, delta),
            _ => bail!("effect on {} needs exactly one of set, copy or add", effect.var),
        };
        Ok(built.when(Formula::new(self.conditions(&effect.when)?)))
    }
}

impl ProblemYaml {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn build(&self) -> anyhow::Result<ProblemContext> {
        let mut builder = ProblemBuilder::new();
        let mut scope = Scope {
            objects: HashMap::new(),
            variables: HashMap::new(),
        };
        for object in &self.objects {
            ensure!(!scope.objects.contains_key(object), "object {object} declared twice");
            scope.objects.insert(object.clone(), builder.object(object));
        }

        let mut symbols = HashMap::new();
        for symbol in &self.symbols {
            ensure!(!symbols.contains_key(&symbol.name), "symbol {} declared twice", symbol.name);
            symbols.insert(symbol.name.clone(), (builder.symbol(&symbol.name, symbol.kind), symbol.kind));
        }

        let mut predicates = Vec::new();
        for variable in &self.variables {
            let &(symbol, kind) = symbols
                .get(&variable.symbol)
                .ok_or_else(|| anyhow!("unknown symbol {}", variable.symbol))?;
            let args = variable
                .args
                .iter()
                .map(|arg| scope.value(&ValueYaml::Name(arg.clone())))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let domain = match (&variable.domain, kind) {
                (Some(DomainYaml::Values(values)), _) => values
                    .iter()
                    .map(|value| scope.value(value))
                    .collect::<anyhow::Result<Vec<_>>>()?,
                (Some(DomainYaml::Range { min, max }), _) => {
                    ensure!(min <= max, "empty range {min}..={max} for {}", variable.symbol);
                    ensure!(
                        i64::from(*max) - i64::from(*min) < MAX_RANGE_LEN,
                        "range {min}..={max} for {} spans more than {MAX_RANGE_LEN} values",
                        variable.symbol
                    );
                    (*min..=*max).collect()
                }
                (None, SymbolKind::Predicate) => vec![0, 1],
                (None, SymbolKind::Function) => {
                    bail!("function variable of {} needs a domain", variable.symbol)
                }
            };

            let name = if variable.args.is_empty() {
                variable.symbol.clone()
            } else {
                format!("{}({})", variable.symbol, variable.args.join(","))
            };
            let index = builder.variable(symbol, args, domain);
            if kind == SymbolKind::Predicate {
                predicates.push(index);
            }
            scope.variables.insert(name, index);
        }

        // Closed world for predicates.
        for variable in predicates {
            builder.initial(variable, 0);
        }
        for (name, value) in &self.init {
            let atom = scope
                .atom(name, value)
                .with_context(|| format!("in the initial value of {name}"))?;
            builder.initial(atom.variable, atom.value);
        }

        for action in &self.actions {
            let precondition = scope
                .conditions(&action.pre)
                .with_context(|| format!("in the precondition of {}", action.name))?;
            let effects = action
                .effects
                .iter()
                .map(|effect| scope.effect(effect))
                .collect::<anyhow::Result<Vec<_>>>()
                .with_context(|| format!("in an effect of {}", action.name))?;
            builder.action(&action.name, precondition, effects);
        }

        for condition in scope.conditions(&self.goal).context("in the goal")? {
            builder.goal(condition);
        }
        builder.build()
    }
}

pub fn load_problem(path: &str) -> anyhow::Result<ProblemContext> {
    let file = File::open(path).with_context(|| format!("failed to open problem file {path}"))?;
    let problem: ProblemYaml = serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse problem file {path}"))?;
    problem
        .build()
        .with_context(|| format!("invalid problem file {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::State;
    use crate::solver::{Budget, BreadthFirstSearch, SearchOutcome, Solver};

    #[test]
    fn test_load_delivery() {
        let problem = load_problem("problems/delivery.yaml").unwrap();
        assert_eq!(problem.variables().len(), 4);
        assert_eq!(problem.variable_by_name("fuel"), Some(2));
        assert_eq!(problem.variable(2).domain, vec![0, 1, 2, 3]);
        // `delivered` is a predicate missing from init.
        assert_eq!(problem.initial_state().value(3), 0);

        let result = BreadthFirstSearch::new(&problem, Budget::unlimited()).solve();
        let SearchOutcome::Solved { plan } = result.outcome else {
            panic!("delivery not solved: {:?}", result.outcome);
        };
        assert_eq!(
            problem.action_names(&plan),
            vec!["drive_depot_market", "load_market", "drive_market_home", "unload"]
        );
    }

    #[test]
    fn test_conditions_and_effects() {
        let yaml = r#"
objects: [a, b]
symbols:
  - { name: at, kind: function }
  - { name: flag, kind: predicate }
  - { name: count, kind: function }
variables:
  - { symbol: at, domain: [a, b] }
  - { symbol: flag }
  - { symbol: count, domain: { min: 0, max: 2 } }
init: { at: a, count: 1 }
actions:
  - name: go
    pre:
      - { var: at, ne: b }
      - any: [{ var: flag, eq: false }, { var: count, eq: 2 }]
    effects:
      - { var: at, set: b }
      - { var: count, add: 1, when: [{ var: flag, eq: false }] }
goal:
  - { var: at, eq: b }
"#;
        let problem = ProblemYaml::from_yaml_str(yaml).unwrap().build().unwrap();
        assert_eq!(problem.initial_state(), &State::new(vec![0, 0, 1]));

        let next = problem.successor(problem.initial_state(), 0).unwrap();
        assert_eq!(next, State::new(vec![1, 0, 2]));
        assert!(problem.is_goal(&next));
        assert!(problem.successor(&next, 0).is_none());
    }

    #[test]
    fn test_unknown_names_are_reported() {
        let yaml = r#"
symbols: [{ name: x, kind: predicate }]
variables: [{ symbol: x }]
goal: [{ var: y, eq: true }]
"#;
        let err = ProblemYaml::from_yaml_str(yaml).unwrap().build().unwrap_err();
        assert!(format!("{err:#}").contains("unknown variable y"));

        let yaml = r#"
symbols: [{ name: f, kind: function }]
variables: [{ symbol: f }]
goal: []
"#;
        assert!(ProblemYaml::from_yaml_str(yaml).unwrap().build().is_err());
    }

    #[test]
    fn test_oversized_range_is_rejected() {
        let yaml = r#"
symbols: [{ name: f, kind: function }]
variables: [{ symbol: f, domain: { min: 0, max: 2147483647 } }]
init: { f: 0 }
goal: []
"#;
        let err = ProblemYaml::from_yaml_str(yaml).unwrap().build().unwrap_err();
        assert!(err.to_string().contains("spans more than"));

        let yaml = r#"
symbols: [{ name: f, kind: function }]
variables: [{ symbol: f, domain: { min: 1, max: 65536 } }]
init: { f: 1 }
goal: []
"#;
        let problem = ProblemYaml::from_yaml_str(yaml).unwrap().build().unwrap();
        assert_eq!(problem.variable(0).domain.len(), 65536);
    }

    #[test]
    fn test_mixed_keys_are_rejected() {
        let header = r#"
symbols: [{ name: x, kind: predicate }]
variables: [{ symbol: x }]
"#;
        let condition = format!("{header}goal: [{{ var: x, eq: true, ne: false }}]\n");
        assert!(ProblemYaml::from_yaml_str(&condition).is_err());

        let atom = format!("{header}goal: [{{ any: [{{ var: x, eq: true, ne: false }}] }}]\n");
        assert!(ProblemYaml::from_yaml_str(&atom).is_err());

        let typo = format!("{header}goal: [{{ var: x, eq: true, when: [] }}]\n");
        assert!(ProblemYaml::from_yaml_str(&typo).is_err());

        let effect = format!(
            "{header}actions: [{{ name: a, effects: [{{ var: x, set: true, add: 1 }}] }}]\ngoal: []\n"
        );
        let err = ProblemYaml::from_yaml_str(&effect).unwrap().build().unwrap_err();
        assert!(format!("{err:#}").contains("exactly one of set, copy or add"));

        let unknown = format!("{header}actions: [{{ name: a, effects: [{{ var: x, put: true }}] }}]\ngoal: []\n");
        assert!(ProblemYaml::from_yaml_str(&unknown).is_err());
    }
}
