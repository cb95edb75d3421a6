//! Concept dictionary: reusable, parameterised step sequences.
//!
//! Concepts are collected with [`ConceptDictionaryBuilder`] and resolved in
//! two phases. Registration stores every concept body unresolved; `build`
//! then expands nested concept references depth first, marking concepts in
//! progress so that a reference cycle becomes a parse error instead of
//! unbounded recursion. The finished [`ConceptDictionary`] is immutable and
//! can be shared by reference across threads parsing specifications.

mod parser;

use hashbrown::{HashMap, HashSet};

use crate::lookup::LookupError;
use crate::model::{ConceptInvocation, Step};
use crate::resolver::SpecialResolver;
use crate::result::{ParseError, ParseResult};

/// A registered concept: its definition step and declaring file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    step: Step,
    params: Vec<String>,
    file: String,
}

impl Concept {
    pub(crate) fn new(step: Step, params: Vec<String>, file: String) -> Self {
        Self { step, params, file }
    }

    /// Canonical value the concept is keyed by.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.step.value
    }

    /// The definition step, carrying the body and parameter lookup.
    #[must_use]
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Parameter names in signature order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(String::as_str)
    }

    /// Whether `step` supplies exactly one argument per parameter.
    ///
    /// Escaped braces leave a literal `{}` in a canonical value, so an equal
    /// value alone does not prove the step invokes this concept.
    #[must_use]
    pub fn accepts(&self, step: &Step) -> bool {
        self.params.len() == step.args.len()
    }

    /// Label of the declaring file.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line of the concept heading.
    #[must_use]
    pub fn line(&self) -> usize {
        self.step.line
    }

    pub(crate) fn invocation(&self) -> Option<&ConceptInvocation> {
        self.step.concept()
    }

    fn body(&self) -> &[Step] {
        self.step.nested_steps()
    }
}

/// Resolved concepts keyed by canonical value.
#[derive(Debug, Clone, Default)]
pub struct ConceptDictionary {
    concepts: HashMap<String, Concept>,
}

impl ConceptDictionary {
    /// Start collecting concept files.
    #[must_use]
    pub fn builder(resolver: &SpecialResolver) -> ConceptDictionaryBuilder<'_> {
        ConceptDictionaryBuilder {
            resolver,
            order: Vec::new(),
            concepts: HashMap::new(),
        }
    }

    /// The concept registered for `value`.
    #[must_use]
    pub fn get(&self, value: &str) -> Option<&Concept> {
        self.concepts.get(value)
    }

    /// Whether a concept is registered for `value`.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.concepts.contains_key(value)
    }

    /// Number of concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Whether the dictionary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// All concepts, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    /// Promote `step` when its canonical value names a concept taking as
    /// many parameters as the step has arguments.
    ///
    /// # Errors
    /// Propagates [`LookupError`] from binding the concept parameters.
    pub fn promote(&self, step: Step) -> Result<Step, LookupError> {
        let Some(concept) = self.get(&step.value).filter(|c| c.accepts(&step)) else {
            return Ok(step);
        };
        Step::promote(step, concept)
    }
}

/// Outcome of [`ConceptDictionaryBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ConceptBuild {
    /// Successfully resolved concepts.
    pub dictionary: ConceptDictionary,
    /// Resolution errors, such as reference cycles.
    pub errors: Vec<ParseError>,
}

/// Collects concept files, then resolves nested references.
#[derive(Debug)]
pub struct ConceptDictionaryBuilder<'r> {
    resolver: &'r SpecialResolver,
    order: Vec<String>,
    concepts: HashMap<String, Concept>,
}

impl ConceptDictionaryBuilder<'_> {
    /// Parse and register the concepts in `text`.
    ///
    /// A concept whose canonical value is already registered is rejected and
    /// reported at both declarations; the first declaration is kept.
    pub fn add_file(&mut self, text: &str, origin: &str) -> ParseResult {
        let (concepts, mut result) = parser::parse_concepts(text, origin, self.resolver);
        for concept in concepts {
            if let Some(existing) = self.concepts.get(concept.value()) {
                let message = "Duplicate concept definition found";
                result.errors.push(ParseError::new(
                    existing.file(),
                    existing.line(),
                    existing.step().line_text.as_str(),
                    message,
                ));
                result.error(concept.line(), &concept.step().line_text, message);
                continue;
            }
            log::debug!("registered concept '{}' from {origin}", concept.value());
            self.order.push(concept.value().to_owned());
            self.concepts.insert(concept.value().to_owned(), concept);
        }
        result
    }

    /// Expand nested concept references and freeze the dictionary.
    ///
    /// Concepts taking part in a reference cycle are reported and dropped;
    /// steps referring to them remain plain steps.
    #[must_use]
    pub fn build(self) -> ConceptBuild {
        let mut resolution = Resolution::default();
        for key in &self.order {
            self.resolve(key, &mut resolution);
        }
        log::debug!(
            "resolved {} concepts, {} rejected",
            resolution.resolved.len(),
            resolution.failed.len()
        );
        ConceptBuild {
            dictionary: ConceptDictionary {
                concepts: resolution.resolved,
            },
            errors: resolution.errors,
        }
    }

    fn resolve(&self, key: &str, state: &mut Resolution) {
        if state.resolved.contains_key(key) || state.failed.contains(key) {
            return;
        }
        let Some(concept) = self.concepts.get(key) else {
            return;
        };
        if let Some(position) = state.in_progress.iter().position(|k| k == key) {
            self.report_cycle(state, position);
            return;
        }
        state.in_progress.push(key.to_owned());
        let body: Vec<Step> = concept
            .body()
            .iter()
            .map(|step| self.expand(step.clone(), state))
            .collect();
        state.in_progress.pop();
        if state.failed.contains(key) {
            return;
        }
        let resolved = Concept {
            step: concept.step.clone().with_body(body),
            params: concept.params.clone(),
            file: concept.file.clone(),
        };
        state.resolved.insert(key.to_owned(), resolved);
    }

    fn expand(&self, step: Step, state: &mut Resolution) -> Step {
        if !self
            .concepts
            .get(&step.value)
            .is_some_and(|concept| concept.accepts(&step))
        {
            return step;
        }
        self.resolve(&step.value, state);
        let Some(target) = state.resolved.get(&step.value) else {
            return step;
        };
        match Step::promote(step.clone(), target) {
            Ok(promoted) => promoted,
            Err(err) => {
                state
                    .errors
                    .push(ParseError::new(target.file(), step.line, step.line_text.as_str(), err.to_string()));
                step
            }
        }
    }

    fn report_cycle(&self, state: &mut Resolution, start: usize) {
        let members: Vec<String> = state.in_progress.iter().skip(start).cloned().collect();
        let mut chain = members.clone();
        chain.extend(members.first().cloned());
        let message = format!(
            "Circular reference found in concept: {}",
            chain.join(" -> ")
        );
        for key in members {
            if let Some(concept) = self.concepts.get(&key) {
                log::warn!("{}:{} {message}", concept.file(), concept.line());
                state.errors.push(ParseError::new(
                    concept.file(),
                    concept.line(),
                    concept.step().line_text.as_str(),
                    message.as_str(),
                ));
            }
            state.failed.insert(key);
        }
    }
}

#[derive(Default)]
struct Resolution {
    resolved: HashMap<String, Concept>,
    failed: HashSet<String>,
    in_progress: Vec<String>,
    errors: Vec<ParseError>,
}

#[cfg(test)]
mod tests;
