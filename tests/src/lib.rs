//! End-to-end scenarios and cross-crate invariants for the `lunac` front
//! end, run through the public `lunac::CompilerContext` API plus the
//! lower-level crates where a scenario needs to inspect raw or typed AST
//! shape the context doesn't expose.

#[cfg(test)]
mod scenarios {
    use lunac::CompilerContext;
    use lunac_ast::Astyp;
    use lunac_ir::{decode, Insn, Op as IrOp};

    #[test]
    fn empty_input_has_no_tokens_beyond_eof_and_runs_cleanly() {
        let mut ctx = CompilerContext::new();
        let lex = ctx.lex("").unwrap();
        assert_eq!(lex.len(), 1);
        assert!(matches!(lex.toks[0], lunac_lex::TokenKind::Eof));

        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();
        let vm = ctx.run(&compiled).unwrap();
        assert_eq!(vm.steps, 1); // just the Halt sentinel
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn lone_identifier_gets_id_one_at_offset_zero() {
        let mut ctx = CompilerContext::new();
        let lex = ctx.lex("x").unwrap();
        assert!(matches!(lex.toks[0], lunac_lex::TokenKind::Ident));
        assert_eq!(lex.bits[0], 1);
        assert_eq!(lex.pos(0).offset(), 0);

        let raw = ctx.parse(&lex).unwrap();
        let root = raw.arena.get(raw.root);
        let stmts = match root {
            lunac_syn::RawNode::Block(s) => s,
            other => panic!("expected a block, got {other:?}"),
        };
        assert_eq!(stmts.len(), 1);
        match raw.arena.get(stmts[0]) {
            lunac_syn::RawNode::ExprStmt(e) => match raw.arena.get(*e) {
                lunac_syn::RawNode::Id(id) => assert_eq!(id.as_u32(), 1),
                other => panic!("expected a bare Id, got {other:?}"),
            },
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    #[test]
    fn constant_expression_folds_to_a_single_literal() {
        let mut ctx = CompilerContext::new();
        let lex = ctx.lex("y = 1 + 2 * 3").unwrap();
        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();

        let stmts = top_level_stmts(&compiled.arena, compiled.root);
        assert_eq!(stmts.len(), 1);
        let stmt = compiled.arena.astmt(stmts[0]).s;
        assert_eq!(stmt.typ(), Astyp::Aasgnst);
        let asgn = compiled.arena.aasgnst(stmt);
        assert_eq!(asgn.e.typ(), Astyp::Ailit);
        assert_eq!(compiled.arena.ailit(asgn.e).val, 7);
    }

    #[test]
    fn shadowed_bindings_resolve_to_distinct_variables() {
        let mut ctx = CompilerContext::new();
        let lex = ctx
            .lex("a=1\n{\n  a=2\n  b=a\n}\nc=a")
            .unwrap();
        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();

        let top = top_level_stmts(&compiled.arena, compiled.root);

        let outer_a_vid = asgn_target_vid(&compiled.arena, top[0]);
        let inner_block_stmts = inner_block(&compiled.arena, top[1]);
        let inner_a_vid = asgn_target_vid(&compiled.arena, inner_block_stmts[0]);
        let b_rhs_vid = asgn_rhs_var_vid(&compiled.arena, inner_block_stmts[1]);
        let outer_c_rhs_vid = asgn_rhs_var_vid(&compiled.arena, top[2]);

        assert_ne!(outer_a_vid, inner_a_vid);
        assert_eq!(b_rhs_vid, inner_a_vid);
        assert_eq!(outer_c_rhs_vid, outer_a_vid);
    }

    #[test]
    fn while_loop_lowers_to_load_branch_sub_store_jump() {
        let mut ctx = CompilerContext::new();
        let lex = ctx.lex("while n > 0: n = n - 1").unwrap();
        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();

        let insns: Vec<Insn> = compiled.code.iter().map(|w| decode(*w)).collect();

        let first_load = insns
            .iter()
            .position(|i| matches!(i, Insn::Load { .. }))
            .expect("no load emitted");
        let first_bcc = insns
            .iter()
            .position(|i| matches!(i, Insn::Bcc { .. }))
            .expect("no conditional branch emitted");
        let sub = insns
            .iter()
            .position(|i| matches!(i, Insn::Arith { op: IrOp::Sub, .. }))
            .expect("no subtraction emitted");
        let store = insns
            .iter()
            .position(|i| matches!(i, Insn::Store { .. }))
            .expect("no store emitted");
        let jump_back = insns
            .iter()
            .position(|i| matches!(i, Insn::Jmp { .. }))
            .expect("no jump back to the loop head emitted");

        assert!(first_load < first_bcc);
        assert!(first_bcc < sub);
        assert!(sub < store);
        assert!(store < jump_back);
    }

    #[test]
    fn countdown_from_a_large_power_of_two_terminates_at_zero() {
        let mut ctx = CompilerContext::new();
        // `1 << 24`: the grammar has no shift operator, so the literal is
        // spelled out instead of reusing the shift form from the scenario.
        let lex = ctx.lex("n = 16777216\nwhile n > 0: n = n - 1").unwrap();
        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();
        let vm = ctx.run(&compiled).unwrap();
        assert_eq!(vm.mem[0], 0);
    }

    fn top_level_stmts(arena: &lunac_ast::Arena, root: lunac_ast::Node) -> Vec<lunac_ast::Node> {
        assert_eq!(root.typ(), Astyp::Ablk);
        arena.astmtlst(arena.ablk(root).s).stmts.clone()
    }

    fn inner_block<'a>(
        arena: &'a lunac_ast::Arena,
        asgn_or_blk: lunac_ast::Node,
    ) -> Vec<lunac_ast::Node> {
        assert_eq!(asgn_or_blk.typ(), Astyp::Astmt);
        let inner = arena.astmt(asgn_or_blk).s;
        assert_eq!(inner.typ(), Astyp::Ablk);
        arena.astmtlst(arena.ablk(inner).s).stmts.clone()
    }

    fn asgn_target_vid(arena: &lunac_ast::Arena, stmt: lunac_ast::Node) -> u32 {
        let asgn = arena.aasgnst(arena.astmt(stmt).s);
        arena.avar(asgn.tgt).id
    }

    fn asgn_rhs_var_vid(arena: &lunac_ast::Arena, stmt: lunac_ast::Node) -> u32 {
        let asgn = arena.aasgnst(arena.astmt(stmt).s);
        arena.avar(asgn.e).id
    }
}

#[cfg(test)]
mod invariants {
    use lunac_intern::IdentMap;

    #[test]
    fn byte_identical_identifiers_intern_to_the_same_id() {
        let mut ctx = lunac::CompilerContext::new();
        let lex = ctx.lex("x = x + x").unwrap();
        let id_bits: Vec<u64> = lex
            .toks
            .iter()
            .enumerate()
            .filter(|(_, t)| matches!(t, lunac_lex::TokenKind::Ident))
            .map(|(i, _)| lex.bits[i])
            .collect();
        assert!(id_bits.iter().all(|b| *b == id_bits[0]));
    }

    #[test]
    fn token_positions_are_monotonic() {
        let mut ctx = lunac::CompilerContext::new();
        let lex = ctx.lex("a = 1 + 2\nb = a * 3").unwrap();
        for i in 1..lex.len() {
            assert!(lex.pos(i - 1).offset() <= lex.pos(i).offset());
        }
    }

    #[test]
    fn every_node_handle_decodes_to_a_valid_discriminant() {
        let mut ctx = lunac::CompilerContext::new();
        let lex = ctx.lex("a = 1\nb = a + 2\nwhile b > 0: b = b - 1").unwrap();
        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();
        assert_eq!(compiled.arena.nhs().len(), compiled.arena.node_count());
        const KNOWN_DISCRIMINANTS: u32 = 21; // Aid..=Aeof
        for &bits in compiled.arena.nhs() {
            assert!((bits >> lunac_ast::ATYBIT) < KNOWN_DISCRIMINANTS);
        }
    }

    #[test]
    fn constant_folding_is_idempotent() {
        let mut ctx1 = lunac::CompilerContext::new();
        let lex1 = ctx1.lex("y = 1 + 2 * 3").unwrap();
        let raw1 = ctx1.parse(&lex1).unwrap();
        let once = ctx1.compile(&raw1).unwrap();

        let mut ctx2 = lunac::CompilerContext::new();
        let lex2 = ctx2.lex("y = 1 + 2 * 3").unwrap();
        let raw2 = ctx2.parse(&lex2).unwrap();
        let twice = ctx2.compile(&raw2).unwrap();

        assert_eq!(once.code, twice.code);
    }

    #[test]
    fn identifier_map_is_stable_under_growth() {
        let mut m = IdentMap::with_capacity_hint(0);
        let mut seen = Vec::new();
        for i in 0..300 {
            let name = format!("v{i}");
            seen.push((name.clone(), m.get_or_add(name.as_bytes())));
        }
        for (name, id) in &seen {
            assert_eq!(m.get(name.as_bytes()), Some(*id));
        }
    }
}
