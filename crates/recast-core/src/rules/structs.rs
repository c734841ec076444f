//! Struct-to-struct conversion.

use recast_types::{Field, TypeId};

use crate::config::FieldsConfig;
use crate::error::{ErrorKind, Frame, SynthError};
use crate::generator::Generator;
use crate::ops::{field, var, Expr, Stmt};
use crate::rules::ConversionRule;

/// Convert every target field from an identically-named source field,
/// honoring rename overrides, ignore lists, and optional
/// case-insensitive matching. A target field with no resolvable source
/// fails synthesis naming that field; every nested failure carries the
/// field's path frame with both type names.
pub struct StructToStruct;

impl ConversionRule for StructToStruct {
    fn name(&self) -> &'static str {
        "struct-to-struct"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        gen.store().struct_fields(source).is_some() && gen.store().struct_fields(target).is_some()
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let store = gen.store();
        let source_fields = store
            .struct_fields(source)
            .unwrap_or_else(|| unreachable!("struct rule matched a non-struct source"));
        let target_fields = store
            .struct_fields(target)
            .unwrap_or_else(|| unreachable!("struct rule matched a non-struct target"));
        let target_ident = store.identity(target);
        let fields_cfg = gen.config().fields.clone();

        let out = gen.fresh("out");
        let mut stmts = vec![Stmt::VarDecl {
            name: out.clone(),
            ty: target_ident.clone(),
            init: None,
        }];

        for target_field in target_fields {
            if fields_cfg.ignore.contains(&target_field.name) {
                continue;
            }
            let (accessor, accessor_ty, path_label) = resolve_source(
                gen,
                &fields_cfg,
                source_fields,
                source_expr.clone(),
                target_field,
                &target_ident,
            )?;
            let source_ty_name = store.identity(accessor_ty);
            let target_ty_name = store.identity(target_field.ty);
            let (field_stmts, converted) = gen
                .convert(accessor, accessor_ty, target_field.ty)
                .map_err(|e| {
                    e.lift(Frame::field(
                        path_label,
                        target_field.name.clone(),
                        Some(source_ty_name),
                        Some(target_ty_name),
                    ))
                })?;
            stmts.extend(field_stmts);
            stmts.push(Stmt::Assign {
                lhs: field(var(&out), target_field.name.clone()),
                rhs: converted,
            });
        }
        Ok((stmts, var(out)))
    }
}

/// Resolve the source accessor for one target field: a rename override
/// walks its dotted path; otherwise the identically-named source field
/// is used, case-insensitively when configured.
fn resolve_source(
    gen: &Generator<'_>,
    cfg: &FieldsConfig,
    source_fields: &[Field],
    source_expr: Expr,
    target_field: &Field,
    target_ident: &str,
) -> Result<(Expr, TypeId, String), SynthError> {
    let segments: Vec<String> = match cfg.rename.get(&target_field.name) {
        Some(path) => path.segments().to_vec(),
        None => vec![target_field.name.clone()],
    };

    let mut expr = source_expr;
    let mut fields = source_fields;
    let mut current_ty = None;
    let mut labels = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        let found = find_field(fields, segment, cfg.ignore_case, target_field, target_ident)?;
        expr = field(expr, found.name.clone());
        labels.push(found.name.clone());
        current_ty = Some(found.ty);
        if i + 1 < segments.len() {
            fields = gen.store().struct_fields(found.ty).ok_or_else(|| {
                missing(target_field, target_ident)
            })?;
        }
    }
    match current_ty {
        Some(ty) => Ok((expr, ty, labels.join("."))),
        // An empty rename path cannot resolve anything.
        None => Err(missing(target_field, target_ident)),
    }
}

fn find_field<'f>(
    fields: &'f [Field],
    name: &str,
    ignore_case: bool,
    target_field: &Field,
    target_ident: &str,
) -> Result<&'f Field, SynthError> {
    if let Some(found) = fields.iter().find(|f| f.name == name) {
        return Ok(found);
    }
    if ignore_case {
        let folded: Vec<&Field> = fields
            .iter()
            .filter(|f| f.name.eq_ignore_ascii_case(name))
            .collect();
        match folded.as_slice() {
            [single] => return Ok(single),
            [] => {}
            many => {
                return Err(SynthError::new(ErrorKind::AmbiguousField {
                    field: target_field.name.clone(),
                    candidates: many.iter().map(|f| f.name.clone()).collect(),
                })
                .lift(missing_frame(target_field, target_ident)));
            }
        }
    }
    Err(missing(target_field, target_ident))
}

fn missing(target_field: &Field, target_ident: &str) -> SynthError {
    SynthError::new(ErrorKind::MissingField {
        field: target_field.name.clone(),
        target_type: target_ident.to_string(),
    })
    .lift(missing_frame(target_field, target_ident))
}

/// A one-sided frame: the target accessor exists, the source side has
/// nothing to point at.
fn missing_frame(target_field: &Field, target_ident: &str) -> Frame {
    Frame {
        prefix: ".",
        source: String::new(),
        target: target_field.name.clone(),
        source_type: None,
        target_type: Some(target_ident.to_string()),
    }
}
