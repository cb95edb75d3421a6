//! Data-table expansion into scenario instances.
//!
//! A spec data table repeats scenarios once per row. When the context or
//! teardown steps reference a column, every scenario repeats; otherwise only
//! the scenarios referencing a column repeat and the rest run once, in the
//! first iteration. A scenario data table repeats its scenario once per row
//! within each iteration, either materialised up front or through
//! [`LazyScenarioRows`].

use crate::config::ScenarioInit;
use crate::lookup::ArgLookup;
use crate::model::{Scenario, Specification, Step};
use crate::resolve::{ArgumentError, ResolvedStep, resolve_steps};

/// Nested expansions above this many iterations are logged.
pub const LARGE_EXPANSION: usize = 100;

/// One concrete run of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioInstance<'s> {
    /// The owning specification.
    pub spec: &'s Specification,
    /// The scenario template.
    pub scenario: &'s Scenario,
    /// Spec data-table row bound for this run.
    pub spec_row: Option<usize>,
    /// Scenario data-table row bound for this run.
    pub scenario_row: Option<usize>,
}

/// Steps of one instance with every argument resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedScenario {
    /// Context steps.
    pub contexts: Vec<ResolvedStep>,
    /// Scenario steps.
    pub steps: Vec<ResolvedStep>,
    /// Teardown steps.
    pub teardown: Vec<ResolvedStep>,
}

impl<'s> ScenarioInstance<'s> {
    /// Bindings of the selected rows; scenario columns shadow spec columns.
    ///
    /// # Errors
    /// Returns [`ArgumentError::Lookup`] when a row index is out of range.
    pub fn row_lookup(&self) -> Result<ArgLookup, ArgumentError> {
        let mut lookup = ArgLookup::new();
        if let Some(row) = self.spec_row {
            lookup.bind_table_row(&self.spec.data_table, row)?;
        }
        if let Some(row) = self.scenario_row {
            lookup.bind_table_row(&self.scenario.data_table, row)?;
        }
        Ok(lookup)
    }

    /// Resolve contexts, scenario steps and teardown for this run.
    ///
    /// # Errors
    /// Returns the first [`ArgumentError`] encountered.
    pub fn resolve_steps(&self) -> Result<ResolvedScenario, ArgumentError> {
        let lookup = self.row_lookup()?;
        Ok(ResolvedScenario {
            contexts: resolve_steps(&self.spec.contexts, &lookup)?,
            steps: resolve_steps(&self.scenario.steps, &lookup)?,
            teardown: resolve_steps(&self.spec.teardown, &lookup)?,
        })
    }
}

/// Instances of a scenario data table built on demand.
///
/// # Examples
/// ```
/// use stepdown::{ConceptDictionary, LazyScenarioRows, SpecParser, SpecialResolver};
/// let resolver = SpecialResolver::default();
/// let dictionary = ConceptDictionary::default();
/// let parsed = SpecParser::new(&dictionary, &resolver)
///     .parse("# Spec\n## Count\n|n|\n|1|\n|2|\n* count <n>\n", "count.spec");
/// let spec = &parsed.specification;
/// let scenario = &spec.scenarios[0];
/// let mut rows = LazyScenarioRows::new(spec, scenario, None);
/// assert_eq!(rows.row_count(), 2);
/// assert_eq!(rows.get(1).and_then(|i| i.scenario_row), Some(1));
/// assert_eq!(rows.next().and_then(|i| i.scenario_row), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyScenarioRows<'s> {
    spec: &'s Specification,
    scenario: &'s Scenario,
    spec_row: Option<usize>,
    next: usize,
}

impl<'s> LazyScenarioRows<'s> {
    /// Rows of `scenario`'s data table, bound alongside `spec_row`.
    #[must_use]
    pub fn new(spec: &'s Specification, scenario: &'s Scenario, spec_row: Option<usize>) -> Self {
        Self {
            spec,
            scenario,
            spec_row,
            next: 0,
        }
    }

    /// Total rows, consumed or not.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.scenario.data_table.row_count()
    }

    /// The instance for `row`, independent of iteration state.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<ScenarioInstance<'s>> {
        (row < self.row_count()).then_some(ScenarioInstance {
            spec: self.spec,
            scenario: self.scenario,
            spec_row: self.spec_row,
            scenario_row: Some(row),
        })
    }

    /// A copy positioned at the first row.
    #[must_use]
    pub fn rewound(&self) -> Self {
        Self { next: 0, ..*self }
    }
}

impl<'s> Iterator for LazyScenarioRows<'s> {
    type Item = ScenarioInstance<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let instance = self.get(self.next)?;
        self.next += 1;
        Some(instance)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.row_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LazyScenarioRows<'_> {}

/// How one scenario runs within an iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioRun<'s> {
    /// Once.
    Single(ScenarioInstance<'s>),
    /// Once per scenario data-table row, materialised.
    Rows(Vec<ScenarioInstance<'s>>),
    /// Once per scenario data-table row, on demand.
    Lazy(LazyScenarioRows<'s>),
}

impl<'s> ScenarioRun<'s> {
    /// The scenario being run.
    #[must_use]
    pub fn scenario(&self) -> Option<&'s Scenario> {
        match self {
            Self::Single(instance) => Some(instance.scenario),
            Self::Rows(rows) => rows.first().map(|instance| instance.scenario),
            Self::Lazy(rows) => Some(rows.scenario),
        }
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Rows(rows) => rows.len(),
            Self::Lazy(rows) => rows.row_count(),
        }
    }

    /// Whether the run produces no instance.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every instance in order; lazy runs are materialised while iterating.
    pub fn instances(&self) -> impl Iterator<Item = ScenarioInstance<'s>> + '_ {
        let (listed, lazy) = match self {
            Self::Single(instance) => (std::slice::from_ref(instance), None),
            Self::Rows(rows) => (rows.as_slice(), None),
            Self::Lazy(rows) => (&[][..], Some(rows.rewound())),
        };
        listed.iter().copied().chain(lazy.into_iter().flatten())
    }
}

/// Scenarios run for one spec data-table row, or once without a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecIteration<'s> {
    /// Spec data-table row, if any.
    pub spec_row: Option<usize>,
    /// Scenario runs in source order.
    pub runs: Vec<ScenarioRun<'s>>,
}

/// Every scenario instance of a specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan<'s> {
    /// The planned specification.
    pub spec: &'s Specification,
    /// Iterations in order.
    pub iterations: Vec<SpecIteration<'s>>,
}

fn uses_columns(steps: &[Step], headers: &[String]) -> bool {
    steps.iter().any(|step| step.references_any(headers))
}

impl<'s> ExecutionPlan<'s> {
    /// Expand `spec` using `init` for scenario data tables.
    #[must_use]
    pub fn new(spec: &'s Specification, init: ScenarioInit) -> Self {
        let iterations = if spec.data_table.is_initialized() {
            Self::table_iterations(spec, init)
        } else {
            vec![iteration(spec, spec.scenarios.iter().collect(), None, init)]
        };
        Self { spec, iterations }
    }

    fn table_iterations(spec: &'s Specification, init: ScenarioInit) -> Vec<SpecIteration<'s>> {
        let table = &spec.data_table;
        let headers = table.headers();
        if uses_columns(&spec.contexts, headers) || uses_columns(&spec.teardown, headers) {
            return (0..table.row_count())
                .map(|row| iteration(spec, spec.scenarios.iter().collect(), Some(row), init))
                .collect();
        }
        let (related, unrelated): (Vec<&Scenario>, Vec<&Scenario>) = spec
            .scenarios
            .iter()
            .partition(|scenario| uses_columns(&scenario.steps, headers));
        if related.is_empty() {
            return vec![iteration(spec, unrelated, None, init)];
        }
        let mut iterations: Vec<SpecIteration<'s>> = (0..table.row_count())
            .map(|row| iteration(spec, related.clone(), Some(row), init))
            .collect();
        if let Some(first) = iterations.first_mut() {
            first.runs.extend(iteration(spec, unrelated, None, init).runs);
        }
        iterations
    }

    /// Total number of scenario instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.iterations
            .iter()
            .flat_map(|iteration| &iteration.runs)
            .map(ScenarioRun::len)
            .sum()
    }

    /// Every instance in execution order.
    pub fn instances(&self) -> impl Iterator<Item = ScenarioInstance<'s>> + '_ {
        self.iterations
            .iter()
            .flat_map(|iteration| &iteration.runs)
            .flat_map(ScenarioRun::instances)
    }
}

fn iteration<'s>(
    spec: &'s Specification,
    scenarios: Vec<&'s Scenario>,
    spec_row: Option<usize>,
    init: ScenarioInit,
) -> SpecIteration<'s> {
    let runs = scenarios
        .into_iter()
        .map(|scenario| scenario_run(spec, scenario, spec_row, init))
        .collect();
    SpecIteration { spec_row, runs }
}

fn scenario_run<'s>(
    spec: &'s Specification,
    scenario: &'s Scenario,
    spec_row: Option<usize>,
    init: ScenarioInit,
) -> ScenarioRun<'s> {
    if !scenario.data_table.is_initialized() {
        return ScenarioRun::Single(ScenarioInstance {
            spec,
            scenario,
            spec_row,
            scenario_row: None,
        });
    }
    if spec_row == Some(0) {
        warn_large_expansion(spec, scenario);
    }
    let rows = LazyScenarioRows::new(spec, scenario, spec_row);
    match init {
        ScenarioInit::Eager => ScenarioRun::Rows(rows.collect()),
        ScenarioInit::Lazy => ScenarioRun::Lazy(rows),
    }
}

fn warn_large_expansion(spec: &Specification, scenario: &Scenario) {
    if !uses_columns(&scenario.steps, spec.data_table.headers()) {
        return;
    }
    let spec_rows = spec.data_table.row_count();
    let scenario_rows = scenario.data_table.row_count();
    let total = spec_rows.saturating_mul(scenario_rows);
    if total > LARGE_EXPANSION {
        log::warn!(
            "Scenario '{}' has nested data tables (spec: {spec_rows} rows x scenario: \
             {scenario_rows} rows = {total} total iterations). Consider the lazy scenario \
             initialisation strategy.",
            scenario.heading.text
        );
    }
}
