//! Patterns and binding-name extraction.

use std::rc::Rc;

use c0_common::Span;

use crate::expr::Lit;
use crate::ident::Identifier;
use crate::types::{Type, TypePath};

/// A pattern with its source span.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub node: PatternNode,
    pub span: Span,
}

impl Pattern {
    #[must_use]
    pub fn new(node: PatternNode, span: Span) -> Self {
        Pattern { node, span }
    }
}

/// A field inside a record-shaped pattern. Shorthand `name` binds the
/// field's name; `name: pat` destructures further.
#[derive(Clone, Debug)]
pub struct FieldPattern {
    pub name: Identifier,
    pub pattern: Option<Box<Pattern>>,
    pub span: Span,
}

/// Payload of an enum pattern.
#[derive(Clone, Debug)]
pub enum EnumPayloadPattern {
    Tuple(Vec<Pattern>),
    Record(Vec<FieldPattern>),
}

/// Field list of a modal pattern.
#[derive(Clone, Debug)]
pub struct ModalFieldsPattern {
    pub fields: Vec<FieldPattern>,
}

/// The pattern variants.
#[derive(Clone, Debug)]
pub enum PatternNode {
    Wildcard,
    Literal(Lit),
    Ident(Identifier),
    /// `name: T`, binding `name` with an annotation.
    Typed { name: Identifier, ty: Rc<Type> },
    Tuple(Vec<Pattern>),
    Record {
        path: TypePath,
        fields: Vec<FieldPattern>,
    },
    Enum {
        enum_path: TypePath,
        variant: Identifier,
        payload: Option<EnumPayloadPattern>,
    },
    /// `Modal@State { fields }`.
    Modal {
        path: TypePath,
        state: Identifier,
        fields: Option<ModalFieldsPattern>,
    },
    Range {
        lo: Box<Pattern>,
        hi: Box<Pattern>,
    },
}

fn field_names(fields: &[FieldPattern], out: &mut Vec<Identifier>) {
    for field in fields {
        match &field.pattern {
            Some(sub) => collect_names(sub, out),
            None => out.push(field.name),
        }
    }
}

fn collect_names(pat: &Pattern, out: &mut Vec<Identifier>) {
    match &pat.node {
        PatternNode::Wildcard | PatternNode::Literal(_) => {}
        PatternNode::Ident(name) | PatternNode::Typed { name, .. } => out.push(*name),
        PatternNode::Tuple(elems) => {
            for elem in elems {
                collect_names(elem, out);
            }
        }
        PatternNode::Record { fields, .. } => field_names(fields, out),
        PatternNode::Enum { payload, .. } => match payload {
            None => {}
            Some(EnumPayloadPattern::Tuple(elems)) => {
                for elem in elems {
                    collect_names(elem, out);
                }
            }
            Some(EnumPayloadPattern::Record(fields)) => field_names(fields, out),
        },
        PatternNode::Modal { fields, .. } => {
            if let Some(modal_fields) = fields {
                field_names(&modal_fields.fields, out);
            }
        }
        PatternNode::Range { lo, hi } => {
            collect_names(lo, out);
            collect_names(hi, out);
        }
    }
}

/// The identifiers a pattern binds, in source order. Duplicates are kept;
/// callers decide whether repetition is an error.
#[must_use]
pub fn pat_names(pat: &Pattern) -> Vec<Identifier> {
    let mut out = Vec::new();
    collect_names(pat, &mut out);
    out
}
