use std::sync::Arc;

use mf_adapt::adapter::TypeAdapter;
use mf_adapt::{CompileArgument, DictionaryAdapter, MapKind, NameMatchingStrategy, TypeAdapterSettings};
use mf_core::ast::{
    BlockStmt, Expr, ExprKind, IntrinsicCallKind, Ty, TypeMap, TypeStruct, Value,
};
use mf_core::Result;
use pretty_assertions::assert_eq;

fn person() -> Ty {
    TypeStruct::class("Person")
        .with_field("Name", Ty::string())
        .with_field("Age", Ty::int())
        .into()
}

fn contact() -> Ty {
    let point: Ty = TypeStruct::value("Point")
        .with_field("X", Ty::int())
        .with_field("Y", Ty::int())
        .into();
    TypeStruct::class("Contact")
        .with_field("Email", Ty::string())
        .with_field("Visits", Ty::int())
        .with_field("Nickname", Ty::option(Ty::string()))
        .with_field("Location", point)
        .with_field("Manager", person())
        .into()
}

fn dict_ty() -> Ty {
    Ty::string_map(Ty::any())
}

fn argument(source: Ty, kind: MapKind, settings: TypeAdapterSettings) -> CompileArgument {
    CompileArgument::new(source, dict_ty(), kind, Arc::new(settings))
}

fn src(ty: &Ty) -> Expr {
    Expr::ident("src").with_ty(ty.clone())
}

fn dest() -> Expr {
    Expr::ident("dest").with_ty(dict_ty())
}

fn key_of(expr: &Expr) -> Option<String> {
    match &expr.kind {
        ExprKind::Value(value) => value.as_str().map(str::to_string),
        _ => None,
    }
}

/// Keys written by a block's statements, in statement order
fn block_keys(program: &Expr) -> Vec<String> {
    let ExprKind::Block(block) = &program.kind else {
        panic!("expected a block, got {}", program);
    };
    block
        .body_stmts()
        .iter()
        .filter_map(BlockStmt::as_expr)
        .filter_map(|stmt| {
            let write = match &stmt.kind {
                ExprKind::Guard(guard) => guard.then.as_ref(),
                _ => stmt,
            };
            match &write.kind {
                ExprKind::IndexAssign(assign) => key_of(&assign.key),
                ExprKind::IntrinsicCall(call) => key_of(&call.args[1]),
                _ => None,
            }
        })
        .collect()
}

fn count_guards(program: &Expr) -> usize {
    let mut guards = 0;
    program.walk(&mut |expr| {
        if matches!(expr.kind, ExprKind::Guard(_)) {
            guards += 1;
        }
    });
    guards
}

#[test]
fn can_map_requires_a_string_keyed_dictionary() {
    let adapter = DictionaryAdapter::default();
    assert!(adapter.can_map(&person(), &dict_ty(), MapKind::NewInstance));
    assert!(adapter.can_map(&person(), &Ty::string_map(Ty::int()), MapKind::MergeIntoExisting));

    assert!(!adapter.can_map(&Ty::string(), &dict_ty(), MapKind::NewInstance));
    assert!(!adapter.can_map(&Ty::any(), &dict_ty(), MapKind::NewInstance));
    assert!(!adapter.can_map(&person(), &Ty::map(Ty::int(), Ty::any()), MapKind::NewInstance));
    assert!(!adapter.can_map(&person(), &Ty::list(Ty::any()), MapKind::NewInstance));

    let headers: Ty = TypeStruct::class("Headers")
        .implementing(TypeMap::new(Ty::string(), Ty::string()))
        .into();
    assert!(adapter.can_map(&person(), &headers, MapKind::Projection));
}

#[test]
fn can_inline_truth_table() {
    let adapter = DictionaryAdapter::default();
    let source = src(&person());
    let cases = [
        (MapKind::NewInstance, false, true),
        (MapKind::NewInstance, true, false),
        (MapKind::MergeIntoExisting, false, false),
        (MapKind::MergeIntoExisting, true, false),
        (MapKind::Projection, false, true),
        (MapKind::Projection, true, true),
    ];
    for (kind, ignore_nulls, expected) in cases {
        let arg = argument(
            person(),
            kind,
            TypeAdapterSettings::default().ignore_null_values(ignore_nulls),
        );
        let destination = dest();
        let destination = (kind == MapKind::MergeIntoExisting).then_some(&destination);
        assert_eq!(
            adapter.can_inline(&source, destination, &arg),
            expected,
            "{} with ignore_null_values={}",
            kind,
            ignore_nulls
        );
    }
}

#[test]
fn block_writes_one_entry_per_member_in_order() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let ty = contact();
    let arg = argument(ty.clone(), MapKind::NewInstance, TypeAdapterSettings::default());
    let program = adapter.create_block_expression(&src(&ty), &dest(), &arg)?;

    assert_eq!(
        block_keys(&program),
        vec!["Email", "Visits", "Nickname", "Location", "Manager"]
    );
    let ExprKind::Block(block) = &program.kind else {
        panic!("expected a block");
    };
    assert!(matches!(&block.stmts[0], BlockStmt::Let(stmt) if stmt.mutable && stmt.name.as_str() == "dict"));
    assert_eq!(block.expr.as_deref().and_then(Expr::as_locator).map(|i| i.as_str()), Some("dict"));
    assert_eq!(count_guards(&program), 0);
    Ok(())
}

#[test]
fn guards_only_wrap_nullable_members() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let ty = contact();
    let arg = argument(
        ty.clone(),
        MapKind::NewInstance,
        TypeAdapterSettings::default().ignore_null_values(true),
    );
    let program = adapter.create_block_expression(&src(&ty), &dest(), &arg)?;

    let ExprKind::Block(block) = &program.kind else {
        panic!("expected a block");
    };
    let guarded: Vec<bool> = block
        .body_stmts()
        .iter()
        .filter_map(BlockStmt::as_expr)
        .map(|stmt| matches!(stmt.kind, ExprKind::Guard(_)))
        .collect();
    // Email, Nickname and Manager may be null; Visits and the value struct cannot
    assert_eq!(guarded, vec![true, false, true, false, true]);
    assert_eq!(block_keys(&program).len(), 5);
    Ok(())
}

#[test]
fn block_program_renders_as_source() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let arg = argument(
        person(),
        MapKind::NewInstance,
        TypeAdapterSettings::default().ignore_null_values(true),
    );
    let program = adapter.create_block_expression(&src(&person()), &dest(), &arg)?;
    let expected = r#"{
    let mut dict = dest;
    if src.Name != null {
        dict["Name"] = convert::<Any>(src.Name);
    }
    dict["Age"] = convert::<Any>(src.Age);
    dict
}"#;
    assert_eq!(program.to_string(), expected);
    Ok(())
}

#[test]
fn inline_emits_one_initializer_per_member() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let ty = contact();
    let arg = argument(ty.clone(), MapKind::NewInstance, TypeAdapterSettings::default());
    let program = adapter.create_inline_expression(&src(&ty), &arg)?;

    let ExprKind::MapInit(init) = &program.kind else {
        panic!("expected a map initializer, got {}", program);
    };
    let keys: Vec<String> = init.entries.iter().filter_map(|e| key_of(&e.key)).collect();
    assert_eq!(keys, vec!["Email", "Visits", "Nickname", "Location", "Manager"]);
    assert_eq!(count_guards(&program), 0);
    assert_eq!(program.ty(), Some(&dict_ty()));
    Ok(())
}

#[test]
fn inline_keeps_construct_using_entries_first() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let mut base = mf_core::ast::ExprMapInit::new(dict_ty());
    base.push(Expr::string("Kind"), Expr::value(Value::string("person")));
    let settings = TypeAdapterSettings::default().construct_using(Expr::from(base));
    let arg = argument(person(), MapKind::NewInstance, settings);

    let program = adapter.create_inline_expression(&src(&person()), &arg)?;
    let ExprKind::MapInit(init) = &program.kind else {
        panic!("expected a map initializer");
    };
    let keys: Vec<String> = init.entries.iter().filter_map(|e| key_of(&e.key)).collect();
    assert_eq!(keys, vec!["Kind", "Name", "Age"]);
    Ok(())
}

#[test]
fn generation_is_idempotent() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let ty = contact();
    for kind in [MapKind::NewInstance, MapKind::MergeIntoExisting, MapKind::Projection] {
        let arg = argument(
            ty.clone(),
            kind,
            TypeAdapterSettings::default().name_matching(NameMatchingStrategy::flexible()),
        );
        let destination = dest();
        let destination = (kind == MapKind::MergeIntoExisting).then_some(&destination);
        let first = adapter.create_expression(&src(&ty), destination, &arg)?;
        let second = adapter.create_expression(&src(&ty), destination, &arg)?;
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
    Ok(())
}

fn uses_flexible_intrinsics(program: &Expr) -> bool {
    program.any(|expr| matches!(&expr.kind, ExprKind::IntrinsicCall(call) if call.kind.is_flexible()))
}

#[test]
fn identity_destination_converter_never_uses_flexible_lookups() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    for strategy in [NameMatchingStrategy::exact(), NameMatchingStrategy::to_camel_case()] {
        let arg = argument(
            person(),
            MapKind::MergeIntoExisting,
            TypeAdapterSettings::default().name_matching(strategy),
        );
        let program = adapter.create_block_expression(&src(&person()), &dest(), &arg)?;
        assert!(!uses_flexible_intrinsics(&program));
        assert!(program.any(|expr| matches!(
            &expr.kind,
            ExprKind::IntrinsicCall(call) if call.kind == IntrinsicCallKind::GetValueOrDefault
        )));
    }

    let arg = argument(
        person(),
        MapKind::MergeIntoExisting,
        TypeAdapterSettings::default().name_matching(NameMatchingStrategy::from_camel_case()),
    );
    let program = adapter.create_block_expression(&src(&person()), &dest(), &arg)?;
    assert!(uses_flexible_intrinsics(&program));
    assert!(!program.any(|expr| matches!(expr.kind, ExprKind::IndexAssign(_))));
    Ok(())
}

#[test]
fn non_merge_blocks_read_no_prior_values() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let arg = argument(
        person(),
        MapKind::NewInstance,
        TypeAdapterSettings::default()
            .ignore_null_values(true)
            .name_matching(NameMatchingStrategy::from_camel_case()),
    );
    let program = adapter.create_block_expression(&src(&person()), &dest(), &arg)?;
    assert!(!program.any(|expr| matches!(expr.kind, ExprKind::IntrinsicCall(_))));
    Ok(())
}

#[test]
fn source_converter_shapes_the_keys() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let ty: Ty = TypeStruct::class("Profile")
        .with_field("FirstName", Ty::string())
        .with_field("LastLogin", Ty::string())
        .into();
    let arg = argument(
        ty.clone(),
        MapKind::NewInstance,
        TypeAdapterSettings::default()
            .ignore_null_values(true)
            .name_matching(NameMatchingStrategy::to_camel_case()),
    );
    let program = adapter.create_block_expression(&src(&ty), &dest(), &arg)?;
    assert_eq!(block_keys(&program), vec!["firstName", "lastLogin"]);
    Ok(())
}

#[test]
fn nested_merge_converts_with_the_prior_value() -> Result<()> {
    let adapter = DictionaryAdapter::default();
    let team: Ty = TypeStruct::class("Team").with_field("Lead", person()).into();
    let destination_ty = Ty::string_map(Ty::string_map(Ty::any()));
    let arg = CompileArgument::new(
        team.clone(),
        destination_ty.clone(),
        MapKind::MergeIntoExisting,
        Arc::new(TypeAdapterSettings::default()),
    );
    let program =
        adapter.create_block_expression(&src(&team), &Expr::ident("dest").with_ty(destination_ty), &arg)?;

    let mut converts = Vec::new();
    program.walk(&mut |expr| {
        if let ExprKind::Convert(convert) = &expr.kind {
            if convert.via.is_some() {
                converts.push(convert);
            }
        }
    });
    assert_eq!(converts.len(), 1);
    let convert = converts[0];
    let existing = convert.existing.as_deref().map(|e| &e.kind);
    assert!(matches!(
        existing,
        Some(ExprKind::IntrinsicCall(call)) if call.kind == IntrinsicCallKind::GetValueOrDefault
    ));
    let via = convert.via.as_ref().map(|via| via.params.len());
    assert_eq!(via, Some(2));
    Ok(())
}

#[test]
fn read_only_destinations_are_rejected_by_generators() {
    let adapter = DictionaryAdapter::default();
    let frozen = Ty::Map(TypeMap::new(Ty::string(), Ty::any()).read_only());
    assert!(adapter.can_map(&person(), &frozen, MapKind::NewInstance));

    let arg = CompileArgument::new(
        person(),
        frozen,
        MapKind::NewInstance,
        Arc::new(TypeAdapterSettings::default()),
    );
    let err = adapter.create_inline_expression(&src(&person()), &arg).err();
    assert!(err.is_some_and(|err| err.is_configuration()));
}
