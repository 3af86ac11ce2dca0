//! Noun-phrase to graph-pattern compiler
//!
//! A phrase compiles the same way in both modes; only the operations differ.
//! In [`CompileMode::Create`] class nodes are merged by lemma, instance nodes
//! are created fresh and stamped with their composite name, and every edge is
//! created. In [`CompileMode::Match`] every element is matched and instances
//! are looked up by their composite name, so a freshly parsed phrase finds
//! exactly the entity stored earlier under the same phrase.
//!
//! ```
//! use recall_kg::compiler::{compile, CompileMode};
//! use recall_kg::schema::{NounPhrase, SpecifierTag};
//!
//! let my_watch = NounPhrase::new("ceas")
//!     .with_specifier(SpecifierTag::Whose, NounPhrase::new("meu").with_lemma("eu"));
//!
//! let compiled = compile(&my_watch, CompileMode::Create).unwrap();
//! assert_eq!(compiled.name, "ceas eu");
//! ```

pub mod context;
pub mod cypher;
pub mod facts;
pub mod pattern;

pub use context::{CompileContext, Diagnostic};
pub use facts::{attach_fact, probe_action, probe_fact, FactProbe, FactValue};
pub use pattern::{
    CompileMode, EdgeOp, EdgePattern, NodeOp, NodePattern, Pattern, PatternElement, VarId,
};

use crate::error::{KnowledgeError, Result};
use crate::schema::{NodeLabel, NounPhrase, Relation, SpecifierTag};
use tracing::{debug, warn};

/// Property holding a class lemma, instance composite name or action name
pub const NAME: &str = "name";
/// Property holding a literal fact
pub const VALUE: &str = "value";

/// A compiled phrase and the handle of its root node
#[derive(Debug, Clone)]
pub struct Compiled {
    pub pattern: Pattern,
    /// Variable bound to the phrase's root node
    pub root: VarId,
    /// Composite name of the root
    pub name: String,
}

/// Compile a phrase in a fresh context.
pub fn compile(phrase: &NounPhrase, mode: CompileMode) -> Result<Compiled> {
    let mut ctx = CompileContext::new(mode);
    compile_into(&mut ctx, phrase)
}

/// Compile a phrase inside an existing context, so its variables do not
/// collide with other patterns of the same request.
pub fn compile_into(ctx: &mut CompileContext, phrase: &NounPhrase) -> Result<Compiled> {
    let mut pattern = Pattern::new();
    let (root, name) = compile_node(ctx, phrase, &mut pattern)?;

    debug!(
        mode = ?ctx.mode(),
        root = %root,
        name = %name,
        elements = pattern.elements().len(),
        "Compiled noun phrase"
    );

    Ok(Compiled {
        pattern,
        root,
        name,
    })
}

fn compile_node(
    ctx: &mut CompileContext,
    phrase: &NounPhrase,
    pattern: &mut Pattern,
) -> Result<(VarId, String)> {
    let var = ctx.fresh_var();
    let mode = ctx.mode();

    if phrase.is_class() {
        pattern.push_node(class_node(var, phrase.lemma(), mode));
        return Ok((var, phrase.lemma().to_string()));
    }

    let mut links = Vec::with_capacity(phrase.specifiers.len());
    let mut name = phrase.value.clone();

    for specifier in &phrase.specifiers {
        let Some(tag) = specifier.tag() else {
            reject_specifier(ctx, phrase, &specifier.phrase, &specifier.question)?;
            continue;
        };

        let (child, child_name) = compile_node(ctx, &specifier.phrase, pattern)?;
        name.push(' ');
        name.push_str(&child_name);
        links.push((tag, child));
    }

    let class = ctx.fresh_var();
    let op = match mode {
        CompileMode::Create => NodeOp::Create,
        CompileMode::Match => NodeOp::Match,
    };
    let instance = NodePattern::new(var, NodeLabel::Instance, op).with_property(NAME, name.clone());
    pattern.push_node(instance);
    pattern.push_node(class_node(class, phrase.lemma(), mode));
    pattern.push_edge(EdgePattern::new(var, Relation::IsA, class, mode.into()));

    for (tag, child) in links {
        let edge = match tag {
            SpecifierTag::WhichKind => EdgePattern::new(var, Relation::Spec, child, mode.into()),
            // the possessor owns the possessed
            SpecifierTag::Whose => EdgePattern::new(child, Relation::Has, var, mode.into()),
        };
        pattern.push_edge(edge);
    }

    Ok((var, name))
}

fn class_node(var: VarId, lemma: &str, mode: CompileMode) -> NodePattern {
    let op = match mode {
        CompileMode::Create => NodeOp::Merge,
        CompileMode::Match => NodeOp::Match,
    };
    NodePattern::new(var, NodeLabel::Class, op).with_property(NAME, lemma)
}

fn reject_specifier(
    ctx: &mut CompileContext,
    parent: &NounPhrase,
    specifier: &NounPhrase,
    tag: &str,
) -> Result<()> {
    if ctx.is_strict() {
        return Err(KnowledgeError::UnrecognizedRelationTag {
            tag: tag.to_string(),
            phrase: specifier.value.clone(),
        });
    }

    warn!(
        parent = %parent.value,
        specifier = %specifier.value,
        tag = %tag,
        "Dropping specifier with unrecognized relation tag"
    );
    ctx.record(Diagnostic {
        parent: parent.value.clone(),
        specifier: specifier.value.clone(),
        tag: tag.to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::pattern::PatternElement;

    fn my_watch() -> NounPhrase {
        NounPhrase::new("ceas")
            .with_lemma("ceas")
            .with_specifier(SpecifierTag::Whose, NounPhrase::new("meu").with_lemma("eu"))
    }

    fn labels(pattern: &Pattern, label: NodeLabel) -> Vec<&NodePattern> {
        pattern.nodes().filter(|n| n.label == Some(label)).collect()
    }

    #[test]
    fn test_class_phrase_creates_merged_class() {
        let compiled = compile(&NounPhrase::new("masă"), CompileMode::Create).unwrap();

        assert_eq!(compiled.name, "masă");
        assert_eq!(compiled.root, VarId(0));
        assert_eq!(compiled.pattern.elements().len(), 1);

        let node = compiled.pattern.node(compiled.root).unwrap();
        assert_eq!(node.label, Some(NodeLabel::Class));
        assert_eq!(node.op, NodeOp::Merge);
        assert_eq!(node.property(NAME), Some("masă"));
    }

    #[test]
    fn test_possessive_composite_naming() {
        let compiled = compile(&my_watch(), CompileMode::Create).unwrap();
        let pattern = &compiled.pattern;

        assert_eq!(compiled.name, "ceas eu");

        let instances = labels(pattern, NodeLabel::Instance);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].var, compiled.root);
        assert_eq!(instances[0].op, NodeOp::Create);
        assert_eq!(instances[0].property(NAME), Some("ceas eu"));

        let classes: Vec<_> = labels(pattern, NodeLabel::Class)
            .into_iter()
            .filter(|n| n.property(NAME) == Some("ceas"))
            .collect();
        assert_eq!(classes.len(), 1);

        let has: Vec<_> = pattern.edges().filter(|e| e.relation == Relation::Has).collect();
        assert_eq!(has.len(), 1);
        assert_eq!(has[0].to, compiled.root);
        let possessor = pattern.node(has[0].from).unwrap();
        assert_eq!(possessor.property(NAME), Some("eu"));

        let is_a: Vec<_> = pattern.edges().filter(|e| e.relation == Relation::IsA).collect();
        assert_eq!(is_a.len(), 1);
        assert_eq!(is_a[0].from, compiled.root);
        assert_eq!(is_a[0].to, classes[0].var);
    }

    #[test]
    fn test_descriptive_specifier_points_from_instance() {
        let red_car = NounPhrase::new("mașina")
            .with_lemma("mașină")
            .with_specifier(SpecifierTag::WhichKind, NounPhrase::new("roșie").with_lemma("roșu"));

        let compiled = compile(&red_car, CompileMode::Create).unwrap();
        assert_eq!(compiled.name, "mașina roșu");

        let spec: Vec<_> = compiled
            .pattern
            .edges()
            .filter(|e| e.relation == Relation::Spec)
            .collect();
        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0].from, compiled.root);
    }

    #[test]
    fn test_nested_composite_name_follows_traversal_order() {
        // "cheile de la mașina mea roșie"
        let car = NounPhrase::new("mașina")
            .with_lemma("mașină")
            .with_specifier(SpecifierTag::Whose, NounPhrase::new("mea").with_lemma("eu"))
            .with_specifier(SpecifierTag::WhichKind, NounPhrase::new("roșie").with_lemma("roșu"));
        let keys = NounPhrase::new("cheile")
            .with_lemma("cheie")
            .with_specifier(SpecifierTag::WhichKind, car);

        let compiled = compile(&keys, CompileMode::Create).unwrap();
        assert_eq!(compiled.name, "cheile mașina eu roșu");

        let names: Vec<_> = labels(&compiled.pattern, NodeLabel::Instance)
            .iter()
            .filter_map(|n| n.property(NAME))
            .collect();
        assert_eq!(names, vec!["mașina eu roșu", "cheile mașina eu roșu"]);
    }

    #[test]
    fn test_nodes_precede_edges_that_use_them() {
        let compiled = compile(&my_watch(), CompileMode::Create).unwrap();
        let mut seen = std::collections::HashSet::new();

        for element in compiled.pattern.elements() {
            match element {
                PatternElement::Node(n) => {
                    seen.insert(n.var);
                }
                PatternElement::Edge(e) => {
                    assert!(seen.contains(&e.from) && seen.contains(&e.to));
                }
            }
        }
    }

    #[test]
    fn test_match_mode_looks_up_instance_by_name() {
        let compiled = compile(&my_watch(), CompileMode::Match).unwrap();

        assert_eq!(compiled.name, "ceas eu");
        for node in compiled.pattern.nodes() {
            assert_eq!(node.op, NodeOp::Match);
        }
        let instance = compiled.pattern.node(compiled.root).unwrap();
        assert_eq!(instance.label, Some(NodeLabel::Instance));
        assert_eq!(instance.property(NAME), Some("ceas eu"));
        assert!(compiled.pattern.edges().all(|e| e.op == EdgeOp::Match));
    }

    #[test]
    fn test_match_mode_is_deterministic() {
        let first = compile(&my_watch(), CompileMode::Match).unwrap();
        let second = compile(&my_watch(), CompileMode::Match).unwrap();
        assert_eq!(first.pattern.shape(), second.pattern.shape());

        // Same phrase compiled after other patterns in a shared context
        let mut ctx = CompileContext::new(CompileMode::Match);
        compile_into(&mut ctx, &NounPhrase::new("masă")).unwrap();
        let shifted = compile_into(&mut ctx, &my_watch()).unwrap();
        assert_ne!(shifted.root, first.root);
        assert_eq!(shifted.pattern.shape(), first.pattern.shape());
    }

    #[test]
    fn test_create_and_match_share_traversal() {
        let created = compile(&my_watch(), CompileMode::Create).unwrap();
        let matched = compile(&my_watch(), CompileMode::Match).unwrap();

        let rels = |p: &Pattern| p.edges().map(|e| (e.from, e.relation, e.to)).collect::<Vec<_>>();
        assert_eq!(rels(&created.pattern), rels(&matched.pattern));
        assert_eq!(created.root, matched.root);
    }

    #[test]
    fn test_unrecognized_tag_is_dropped_with_diagnostic() {
        let phrase = NounPhrase::new("cheile")
            .with_tagged_specifier("unde", NounPhrase::new("acasă"))
            .with_specifier(SpecifierTag::Whose, NounPhrase::new("mele").with_lemma("eu"));

        let mut ctx = CompileContext::new(CompileMode::Create);
        let compiled = compile_into(&mut ctx, &phrase).unwrap();

        assert_eq!(compiled.name, "cheile eu");
        assert!(compiled.pattern.nodes().all(|n| n.property(NAME) != Some("acasă")));
        assert_eq!(compiled.pattern.edges().count(), 2);

        assert_eq!(
            ctx.diagnostics(),
            &[Diagnostic {
                parent: "cheile".to_string(),
                specifier: "acasă".to_string(),
                tag: "unde".to_string(),
            }]
        );
    }

    #[test]
    fn test_unrecognized_tag_fails_in_strict_mode() {
        let phrase = NounPhrase::new("cheile").with_tagged_specifier("unde", NounPhrase::new("acasă"));

        let mut ctx = CompileContext::new(CompileMode::Create).strict(true);
        let err = compile_into(&mut ctx, &phrase).unwrap_err();

        match err {
            KnowledgeError::UnrecognizedRelationTag { tag, phrase } => {
                assert_eq!(tag, "unde");
                assert_eq!(phrase, "acasă");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
