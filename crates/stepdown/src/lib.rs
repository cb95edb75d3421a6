//! Front end for Markdown-style executable specifications.
//!
//! Specification text is tokenized line by line, assembled into a
//! [`Specification`] tree, and checked. Steps naming a concept from the
//! [`ConceptDictionary`] are expanded into their concept bodies. Tag, name
//! and line filters select scenarios, and an [`ExecutionPlan`] expands data
//! tables into scenario instances whose arguments resolve to concrete values.
//!
//! The dictionary is built once, by a single writer, and then shared by
//! reference with every parse of the run:
//!
//! ```
//! use stepdown::{ConceptDictionary, SpecParser, SpecialResolver};
//!
//! let resolver = SpecialResolver::default();
//! let mut builder = ConceptDictionary::builder(&resolver);
//! let concepts = builder.add_file("# greet <name>\n* say \"hello\" and <name>\n", "greet.cpt");
//! assert!(concepts.is_ok());
//! let dictionary = builder.build().dictionary;
//!
//! let parsed = SpecParser::new(&dictionary, &resolver)
//!     .parse("# Spec\n|person|\n|Sam|\n## Greeting\n* greet <person>\n", "greet.spec");
//! assert!(parsed.result.is_ok());
//! ```

pub mod concept;
pub mod config;
pub mod datatable;
pub mod expand;
pub mod filter;
pub mod lexer;
pub mod lookup;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod resolver;
pub mod result;
pub mod step_args;

pub use concept::{Concept, ConceptBuild, ConceptDictionary, ConceptDictionaryBuilder};
pub use config::{ConfigError, ParseConfig, ScenarioInit};
pub use datatable::{CellKind, DataTableError, Table, TableCell};
pub use expand::{
    ExecutionPlan, LazyScenarioRows, ResolvedScenario, ScenarioInstance, ScenarioRun,
    SpecIteration,
};
pub use filter::{ScenarioFilter, TagExprError, TagFilter, filter_specs};
pub use lexer::{LexMode, Token, TokenKind, Tokens, tokenize};
pub use lookup::{ArgLookup, LookupError};
pub use model::{Scenario, Specification, Step};
pub use parser::{ParsedSpec, SpecParser};
pub use resolve::{
    ArgumentError, ParamKind, ResolvedParam, ResolvedStep, ResolvedTable, ResolvedValue,
    resolve_step,
};
pub use resolver::{
    FsResources, InMemoryResources, ResolveError, ResourceLoader, SpecialResolver,
};
pub use result::{ParseError, ParseResult, Warning};
pub use step_args::StepArg;
pub use stepdown_patterns::{StepValue, arg_position_map};
