//! List and map conversions.

use recast_types::{TypeId, TypeKind};

use crate::error::{Frame, SynthError};
use crate::generator::Generator;
use crate::ops::{index, int_lit, len_of, not_nil, var, Expr, Stmt};
use crate::rules::ConversionRule;

fn list_parts(gen: &Generator<'_>, id: TypeId) -> Option<(TypeId, Option<usize>)> {
    match gen.store().kind(gen.store().underlying(id)) {
        TypeKind::List { elem, len } => Some((*elem, *len)),
        _ => None,
    }
}

fn map_parts(gen: &Generator<'_>, id: TypeId) -> Option<(TypeId, TypeId)> {
    match gen.store().kind(gen.store().underlying(id)) {
        TypeKind::Map { key, value } => Some((*key, *value)),
        _ => None,
    }
}

/// List to list, including fixed-length arrays. A nil source slice is
/// preserved as a nil target, never turned into an empty allocation;
/// a non-nil source always yields a target sized from the source
/// length. Element failures carry the loop index in their path.
pub struct ListToList;

impl ConversionRule for ListToList {
    fn name(&self) -> &'static str {
        "list-to-list"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        list_parts(gen, source).is_some() && list_parts(gen, target).is_some()
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let (source_elem, source_len) = list_parts(gen, source)
            .unwrap_or_else(|| unreachable!("list rule matched a non-list source"));
        let (target_elem, target_len) = list_parts(gen, target)
            .unwrap_or_else(|| unreachable!("list rule matched a non-list target"));
        let target_ident = gen.store().identity(target);

        let out = gen.fresh("out");
        let idx = gen.fresh_index();

        let (body, converted) = gen
            .convert(index(source_expr.clone(), var(&idx)), source_elem, target_elem)
            .map_err(|e| e.lift(Frame::indexed(idx.clone())))?;
        let mut loop_body = body;
        loop_body.push(Stmt::Assign {
            lhs: index(var(&out), var(&idx)),
            rhs: converted,
        });

        let mut stmts = vec![Stmt::VarDecl { name: out.clone(), ty: target_ident.clone(), init: None }];
        match target_len {
            // Fixed-length target: no allocation, no nil to guard.
            Some(n) => {
                let limit = match source_len {
                    Some(source_n) => int_lit(source_n.min(n) as i64),
                    None => int_lit(n as i64),
                };
                stmts.push(Stmt::ForIndex { idx, limit, body: loop_body });
            }
            None => {
                let alloc = Stmt::Assign {
                    lhs: var(&out),
                    rhs: Expr::Make {
                        ty: target_ident,
                        len: Some(Box::new(len_of(source_expr.clone()))),
                    },
                };
                let len_loop = Stmt::ForIndex {
                    idx,
                    limit: len_of(source_expr.clone()),
                    body: loop_body,
                };
                if source_len.is_some() {
                    // Fixed-length sources cannot be nil.
                    stmts.push(alloc);
                    stmts.push(len_loop);
                } else {
                    stmts.push(Stmt::If {
                        cond: not_nil(source_expr),
                        then: vec![alloc, len_loop],
                        els: Vec::new(),
                    });
                }
            }
        }
        Ok((stmts, var(out)))
    }
}

/// Map to map: allocate sized by the source, iterate pairs, convert
/// key and value independently. Key and value failures carry distinct
/// path markers. A nil source map stays nil.
pub struct MapToMap;

impl ConversionRule for MapToMap {
    fn name(&self) -> &'static str {
        "map-to-map"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        map_parts(gen, source).is_some() && map_parts(gen, target).is_some()
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let (source_key, source_value) = map_parts(gen, source)
            .unwrap_or_else(|| unreachable!("map rule matched a non-map source"));
        let (target_key, target_value) = map_parts(gen, target)
            .unwrap_or_else(|| unreachable!("map rule matched a non-map target"));
        let target_ident = gen.store().identity(target);

        let out = gen.fresh("out");
        let key = gen.fresh("key");
        let value = gen.fresh("value");

        let (key_stmts, key_converted) = gen
            .convert(var(&key), source_key, target_key)
            .map_err(|e| e.lift(Frame::indexed("mapkey")))?;
        let (value_stmts, value_converted) = gen
            .convert(var(&value), source_value, target_value)
            .map_err(|e| e.lift(Frame::indexed("mapvalue")))?;

        let mut loop_body = key_stmts;
        loop_body.extend(value_stmts);
        loop_body.push(Stmt::Assign {
            lhs: index(var(&out), key_converted),
            rhs: value_converted,
        });

        let stmts = vec![
            Stmt::VarDecl { name: out.clone(), ty: target_ident.clone(), init: None },
            Stmt::If {
                cond: not_nil(source_expr.clone()),
                then: vec![
                    Stmt::Assign {
                        lhs: var(&out),
                        rhs: Expr::Make {
                            ty: target_ident,
                            len: Some(Box::new(len_of(source_expr.clone()))),
                        },
                    },
                    Stmt::ForMap { key, value, over: source_expr, body: loop_body },
                ],
                els: Vec::new(),
            },
        ];
        Ok((stmts, var(out)))
    }
}
