use crate::common::{Atom, ObjectIdx};
use crate::problem::{Condition, Effect, Formula, ProblemBuilder, ProblemContext};

use rand::rngs::StdRng;
use rand::Rng;

// Helper function to setup tracing
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("trace").try_init();
}

fn eq(variable: usize, value: ObjectIdx) -> Condition {
    Condition::Equals(Atom::new(variable, value))
}

/// `x`: 0 -> 1 by a single action.
pub(crate) fn single_switch() -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let x = builder.boolean("x");
    builder.initial(x, 0).goal(eq(x, 1));
    builder.action("set_x", vec![], vec![Effect::assign(x, 1)]);
    builder.build().unwrap()
}

/// Independent `x` and `y`, one action each, goal `x=1 ∧ y=1`.
pub(crate) fn two_switches() -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let x = builder.boolean("x");
    let y = builder.boolean("y");
    builder.initial(x, 0).initial(y, 0).goal(eq(x, 1)).goal(eq(y, 1));
    builder.action("set_x", vec![], vec![Effect::assign(x, 1)]);
    builder.action("set_y", vec![], vec![Effect::assign(y, 1)]);
    builder.build().unwrap()
}

/// `a` sets `x`, `b` sets `y`, and `c` needs both to set the goal `g=1`.
pub(crate) fn conjunctive_precondition() -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let x = builder.boolean("x");
    let y = builder.boolean("y");
    let g = builder.boolean("g");
    builder.initial(x, 0).initial(y, 0).initial(g, 0).goal(eq(g, 1));
    builder.action("a", vec![], vec![Effect::assign(x, 1)]);
    builder.action("b", vec![], vec![Effect::assign(y, 1)]);
    builder.action("c", vec![eq(x, 1), eq(y, 1)], vec![Effect::assign(g, 1)]);
    builder.build().unwrap()
}

/// No action ever writes `x=1`.
pub(crate) fn unreachable_goal() -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let x = builder.boolean("x");
    builder.initial(x, 0).goal(eq(x, 1));
    builder.action("clear_x", vec![], vec![Effect::assign(x, 0)]);
    builder.build().unwrap()
}

/// `s1 .. sn`, where `step_i` needs `s(i-1)=1` and sets `si=1`. Goal `sn=1`.
pub(crate) fn chain(n: usize) -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let steps: Vec<usize> = (1..=n).map(|i| builder.boolean(&format!("s{i}"))).collect();
    for (i, &step) in steps.iter().enumerate() {
        builder.initial(step, 0);
        let precondition = match i {
            0 => vec![],
            _ => vec![eq(steps[i - 1], 1)],
        };
        builder.action(&format!("step_{}", i + 1), precondition, vec![Effect::assign(step, 1)]);
    }
    if let Some(&last) = steps.last() {
        builder.goal(eq(last, 1));
    }
    builder.build().unwrap()
}

/// Actions 0 and 1 both set `x=1`.
pub(crate) fn two_achievers() -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let x = builder.boolean("x");
    builder.initial(x, 0).goal(eq(x, 1));
    builder.action("first", vec![], vec![Effect::assign(x, 1)]);
    builder.action("second", vec![], vec![Effect::assign(x, 1)]);
    builder.build().unwrap()
}

/// `both` (action 0) sets `x` and `y`; `set_x` and `set_y` set one each.
pub(crate) fn shared_achiever() -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let x = builder.boolean("x");
    let y = builder.boolean("y");
    builder.initial(x, 0).initial(y, 0).goal(eq(x, 1)).goal(eq(y, 1));
    builder.action("both", vec![], vec![Effect::assign(x, 1), Effect::assign(y, 1)]);
    builder.action("set_x", vec![], vec![Effect::assign(x, 1)]);
    builder.action("set_y", vec![], vec![Effect::assign(y, 1)]);
    builder.build().unwrap()
}

/// `lock` (action 0) makes the goal unreachable; `step` (action 1) reaches it.
pub(crate) fn lockable_switch() -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let x = builder.boolean("x");
    let locked = builder.boolean("locked");
    builder.initial(x, 0).initial(locked, 0).goal(eq(x, 1));
    builder.action("lock", vec![eq(locked, 0)], vec![Effect::assign(locked, 1)]);
    builder.action("step", vec![eq(locked, 0)], vec![Effect::assign(x, 1)]);
    builder.build().unwrap()
}

/// Counter `c` in `0..=n`, incremented by one; goal `c=n`.
pub(crate) fn counter(n: ObjectIdx) -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let c = builder.numeric("c", (0..=n).collect());
    builder.initial(c, 0).goal(eq(c, n));
    builder.action("inc", vec![], vec![Effect::offset(c, 1)]);
    builder.action("dec", vec![], vec![Effect::offset(c, -1)]);
    builder.build().unwrap()
}

fn random_atom(rng: &mut StdRng, domains: &[Vec<ObjectIdx>]) -> Atom {
    let variable = rng.gen_range(0..domains.len());
    let domain = &domains[variable];
    Atom::new(variable, domain[rng.gen_range(0..domain.len())])
}

fn random_condition(rng: &mut StdRng, domains: &[Vec<ObjectIdx>]) -> Condition {
    match rng.gen_range(0..4) {
        0 => Condition::NotEquals(random_atom(rng, domains)),
        1 => Condition::AnyOf(vec![random_atom(rng, domains), random_atom(rng, domains)]),
        _ => Condition::Equals(random_atom(rng, domains)),
    }
}

/// Small random problem with mixed domains, conditional effects, copies and
/// offsets. Always builds.
pub(crate) fn random_problem(rng: &mut StdRng) -> ProblemContext {
    let mut builder = ProblemBuilder::new();
    let num_variables = rng.gen_range(1..=5);
    let mut domains = Vec::with_capacity(num_variables);
    for i in 0..num_variables {
        let domain: Vec<ObjectIdx> = if rng.gen_bool(0.5) {
            builder.boolean(&format!("p{i}"));
            vec![0, 1]
        } else {
            let domain: Vec<ObjectIdx> = (0..rng.gen_range(2..=4)).collect();
            builder.numeric(&format!("f{i}"), domain.clone());
            domain
        };
        domains.push(domain);
    }
    for (variable, domain) in domains.iter().enumerate() {
        builder.initial(variable, domain[rng.gen_range(0..domain.len())]);
    }

    for a in 0..rng.gen_range(1..=6) {
        let precondition = (0..rng.gen_range(0..=2))
            .map(|_| random_condition(rng, &domains))
            .collect();
        let effects = (0..rng.gen_range(1..=2))
            .map(|_| {
                let target = random_atom(rng, &domains);
                let effect = match rng.gen_range(0..6) {
                    0 => Effect::copy(target.variable, rng.gen_range(0..domains.len())),
                    1 => Effect::offset(target.variable, if rng.gen_bool(0.5) { 1 } else { -1 }),
                    _ => Effect::assign(target.variable, target.value),
                };
                if rng.gen_bool(0.2) {
                    effect.when(Formula::new(vec![random_condition(rng, &domains)]))
                } else {
                    effect
                }
            })
            .collect();
        builder.action(&format!("a{a}"), precondition, effects);
    }

    for _ in 0..rng.gen_range(1..=2) {
        builder.goal(Condition::Equals(random_atom(rng, &domains)));
    }
    builder.build().unwrap()
}
