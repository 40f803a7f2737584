use super::{
    Condition, Effect, EffectValue, Formula, GroundAction, ProblemContext, StateVariable, Symbol,
    SymbolKind,
};
use crate::common::{ActionIdx, Atom, ObjectIdx, State, SymbolIdx, TupleIndex, VariableIdx};

use anyhow::{anyhow, bail, ensure};
use std::collections::{HashMap, HashSet};

/// Incremental construction of a [`ProblemContext`]. All consistency checks
/// happen in [`ProblemBuilder::build`].
#[derive(Debug, Default)]
pub struct ProblemBuilder {
    symbols: Vec<Symbol>,
    objects: Vec<String>,
    variables: Vec<StateVariable>,
    actions: Vec<GroundAction>,
    goal: Vec<Condition>,
    init: Vec<Option<ObjectIdx>>,
}

impl ProblemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&mut self, name: &str) -> ObjectIdx {
        if let Some(position) = self.objects.iter().position(|object| object == name) {
            return position as ObjectIdx;
        }
        self.objects.push(name.to_string());
        (self.objects.len() - 1) as ObjectIdx
    }

    pub fn symbol(&mut self, name: &str, kind: SymbolKind) -> SymbolIdx {
        if let Some(position) = self.symbols.iter().position(|symbol| symbol.name == name) {
            return position;
        }
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
        });
        self.symbols.len() - 1
    }

    /// Declares the ground instance `symbol(args)` named `symbol(arg,...)`.
    pub fn variable(&mut self, symbol: SymbolIdx, args: Vec<ObjectIdx>, domain: Vec<ObjectIdx>) -> VariableIdx {
        let name = self.canonical_name(symbol, &args);
        self.variables.push(StateVariable {
            name,
            symbol,
            args,
            domain,
        });
        self.init.push(None);
        self.variables.len() - 1
    }

    /// Nullary predicate with domain `{0, 1}`.
    pub fn boolean(&mut self, name: &str) -> VariableIdx {
        let symbol = self.symbol(name, SymbolKind::Predicate);
        self.variable(symbol, Vec::new(), vec![0, 1])
    }

    /// Nullary function over the given domain.
    pub fn numeric(&mut self, name: &str, domain: Vec<ObjectIdx>) -> VariableIdx {
        let symbol = self.symbol(name, SymbolKind::Function);
        self.variable(symbol, Vec::new(), domain)
    }

    pub fn action(&mut self, name: &str, precondition: Vec<Condition>, effects: Vec<Effect>) -> ActionIdx {
        let id = self.actions.len();
        self.actions.push(GroundAction::new(
            id,
            name.to_string(),
            Formula::new(precondition),
            effects,
        ));
        id
    }

    pub fn initial(&mut self, variable: VariableIdx, value: ObjectIdx) -> &mut Self {
        self.init[variable] = Some(value);
        self
    }

    pub fn goal(&mut self, condition: Condition) -> &mut Self {
        self.goal.push(condition);
        self
    }

    pub fn build(mut self) -> anyhow::Result<ProblemContext> {
        let mut variable_names = HashMap::new();
        for (variable, var) in self.variables.iter().enumerate() {
            ensure!(
                var.symbol < self.symbols.len(),
                "variable {} refers to unknown symbol {}",
                var.name,
                var.symbol
            );
            ensure!(!var.domain.is_empty(), "variable {} has an empty domain", var.name);
            let mut values = HashSet::new();
            if let Some(value) = var.domain.iter().find(|&&value| !values.insert(value)) {
                bail!("value {value} repeated in the domain of {}", var.name);
            }
            if variable_names.insert(var.name.clone(), variable).is_some() {
                bail!("variable {} declared twice", var.name);
            }
        }

        let mut values = Vec::with_capacity(self.variables.len());
        for (variable, value) in self.init.iter().enumerate() {
            let value = value.ok_or_else(|| {
                anyhow!("no initial value for {}", self.variables[variable].name)
            })?;
            values.push(value);
        }

        for action in &self.actions {
            self.check_formula(&action.precondition)
                .map_err(|err| err.context(format!("in the precondition of {}", action.name)))?;
            for effect in &action.effects {
                self.check_effect(effect)
                    .map_err(|err| err.context(format!("in an effect of {}", action.name)))?;
            }
        }
        let goal = Formula::new(std::mem::take(&mut self.goal));
        self.check_formula(&goal)
            .map_err(|err| err.context("in the goal"))?;

        let index = TupleIndex::new(self.symbols.len(), &self.variables);
        let problem = ProblemContext {
            symbols: self.symbols,
            objects: self.objects,
            variables: self.variables,
            variable_names,
            index,
            actions: self.actions,
            goal,
            initial_state: State::new(values),
        };
        problem.validate_state(problem.initial_state())?;
        Ok(problem)
    }

    fn canonical_name(&self, symbol: SymbolIdx, args: &[ObjectIdx]) -> String {
        let symbol_name = self
            .symbols
            .get(symbol)
            .map_or_else(|| format!("s{symbol}"), |symbol| symbol.name.clone());
        if args.is_empty() {
            return symbol_name;
        }
        let args: Vec<String> = args
            .iter()
            .map(|&arg| match usize::try_from(arg).ok().and_then(|arg| self.objects.get(arg)) {
                Some(name) => name.clone(),
                None => arg.to_string(),
            })
            .collect();
        format!("{symbol_name}({})", args.join(","))
    }

    fn check_variable(&self, variable: VariableIdx) -> anyhow::Result<()> {
        ensure!(
            variable < self.variables.len(),
            "unknown variable x{variable}"
        );
        Ok(())
    }

    fn check_atom(&self, atom: &Atom) -> anyhow::Result<()> {
        self.check_variable(atom.variable)
    }

    fn check_formula(&self, formula: &Formula) -> anyhow::Result<()> {
        for condition in formula.conditions() {
            match condition {
                Condition::Equals(atom) | Condition::NotEquals(atom) => self.check_atom(atom)?,
                Condition::AnyOf(atoms) => {
                    ensure!(!atoms.is_empty(), "empty disjunction");
                    for atom in atoms {
                        self.check_atom(atom)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_effect(&self, effect: &Effect) -> anyhow::Result<()> {
        self.check_formula(&effect.condition)?;
        self.check_variable(effect.variable)?;
        match effect.value {
            EffectValue::Constant(value) => {
                let var = &self.variables[effect.variable];
                ensure!(
                    var.admits(value),
                    "value {value} is outside the domain {:?} of {}",
                    var.domain,
                    var.name
                );
            }
            EffectValue::Variable(source) => self.check_variable(source)?,
            EffectValue::Offset(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names() {
        let mut builder = ProblemBuilder::new();
        let a = builder.object("a");
        let b = builder.object("b");
        let on = builder.symbol("on", SymbolKind::Predicate);
        let on_ab = builder.variable(on, vec![a, b], vec![0, 1]);
        let flag = builder.boolean("flag");
        builder.initial(on_ab, 0).initial(flag, 1);

        let problem = builder.build().unwrap();
        assert_eq!(problem.variable(on_ab).name, "on(a,b)");
        assert_eq!(problem.variable_by_name("flag"), Some(flag));
        assert_eq!(problem.initial_state().values(), &[0, 1]);
    }

    #[test]
    fn test_missing_initial_value() {
        let mut builder = ProblemBuilder::new();
        builder.boolean("x");
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("no initial value"));
    }

    #[test]
    fn test_initial_value_outside_domain() {
        let mut builder = ProblemBuilder::new();
        let x = builder.numeric("x", vec![0, 1, 2]);
        builder.initial(x, 5);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_constant_effect_outside_domain() {
        let mut builder = ProblemBuilder::new();
        let x = builder.boolean("x");
        builder.initial(x, 0);
        builder.action("bad", vec![], vec![Effect::assign(x, 2)]);
        let err = builder.build().unwrap_err();
        assert!(format!("{err:#}").contains("bad"));
    }

    #[test]
    fn test_goal_is_checked() {
        let mut builder = ProblemBuilder::new();
        let x = builder.boolean("x");
        builder.initial(x, 0).goal(Condition::Equals(Atom::new(x, 1)));
        let problem = builder.build().unwrap();
        assert_eq!(problem.goal().conditions().len(), 1);

        let mut builder = ProblemBuilder::new();
        let x = builder.boolean("x");
        builder.initial(x, 0).goal(Condition::Equals(Atom::new(3, 1)));
        let err = builder.build().unwrap_err();
        assert!(format!("{err:#}").contains("in the goal"));
    }

    #[test]
    fn test_successor_respects_domains() {
        let mut builder = ProblemBuilder::new();
        let x = builder.numeric("x", vec![0, 1, 2]);
        builder.initial(x, 1);
        let inc = builder.action("inc", vec![], vec![Effect::offset(x, 1)]);
        let problem = builder.build().unwrap();

        let next = problem.successor(problem.initial_state(), inc).unwrap();
        assert_eq!(next.value(x), 2);
        // 3 is not in the domain of x.
        assert!(problem.successor(&next, inc).is_none());
    }
}
