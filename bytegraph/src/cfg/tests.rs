use super::*;
use crate::bytecode::{decode, opcodes};
use anyhow::Result;

fn cfg_of(code: &[u8], handlers: &[ExceptionHandler]) -> Result<ControlFlowGraph> {
    let instructions = decode(code, 0, code.len())?;
    Ok(ControlFlowGraph::build(&instructions, handlers)?)
}

fn dump(graph: &DirectedGraph) -> String {
    graph
        .edges()
        .iter()
        .map(|e| {
            format!(
                "{} -> {} [{}]",
                graph.node(e.source).label,
                graph.node(e.target).label,
                e.kind
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn out_kinds(graph: &DirectedGraph, node: NodeId) -> Vec<EdgeKind> {
    graph
        .outgoing(node)
        .iter()
        .map(|&e| graph.edge(e).kind)
        .collect()
}

// iload_1; ifeq -> 6; iconst_0; ireturn; iconst_1; ireturn
const BRANCHING: [u8; 8] = [
    opcodes::ILOAD_1,
    opcodes::IFEQ,
    0x00,
    0x05,
    opcodes::ICONST_0,
    opcodes::IRETURN,
    opcodes::ICONST_1,
    opcodes::IRETURN,
];

// iload_1; ifeq -> 10; iinc 1 by -1; goto -> 0; return
const COUNTDOWN_LOOP: [u8; 11] = [
    opcodes::ILOAD_1,
    opcodes::IFEQ,
    0x00,
    0x09,
    opcodes::IINC,
    0x01,
    0xFF,
    opcodes::GOTO,
    0xFF,
    0xF9,
    opcodes::RETURN,
];

#[test]
fn builds_linear_method() -> Result<()> {
    let cfg = cfg_of(&[opcodes::ICONST_0, opcodes::IRETURN], &[])?;
    assert_eq!(cfg.size(), GraphSize { nodes: 4, edges: 3 });
    assert_eq!(cfg.entry(), NodeId(2));
    assert_eq!(cfg.exit(), NodeId(3));
    insta::assert_snapshot!(dump(cfg.graph()), @r"
    entry -> iconst_0 [entry]
    iconst_0 -> ireturn [fall-through]
    ireturn -> exit [exit]
    ");
    Ok(())
}

#[test]
fn size_serializes_for_prescreening() -> Result<()> {
    let cfg = cfg_of(&[opcodes::ICONST_0, opcodes::IRETURN], &[])?;
    assert!(!cfg.size().exceeds_soft_limits());
    insta::assert_yaml_snapshot!(cfg.size(), @r"
    ---
    nodes: 4
    edges: 3
    ");
    let oversized = GraphSize {
        nodes: 3_000,
        edges: 12,
    };
    assert!(oversized.exceeds_soft_limits());
    Ok(())
}

#[test]
fn empty_body_links_entry_to_exit() -> Result<()> {
    let cfg = ControlFlowGraph::build(&[], &[])?;
    assert_eq!(cfg.size(), GraphSize { nodes: 2, edges: 1 });
    let edge = cfg.graph().edges()[0];
    assert_eq!((edge.source, edge.target), (cfg.entry(), cfg.exit()));
    assert_eq!(edge.kind, EdgeKind::Entry);
    assert!(cfg.find_unreachable_nodes().is_empty());
    Ok(())
}

#[test]
fn decision_emits_fall_through_before_taken() -> Result<()> {
    let cfg = cfg_of(&BRANCHING, &[])?;
    let decision = cfg.node_at_offset(1).ok_or_else(|| anyhow::anyhow!("no node at 1"))?;
    assert_eq!(cfg.graph().node(decision).kind, VertexKind::Decision);
    assert_eq!(
        out_kinds(cfg.graph(), decision),
        vec![EdgeKind::FallThrough, EdgeKind::Taken]
    );
    let targets: Vec<Option<u32>> = cfg
        .graph()
        .successors(decision)
        .map(|s| cfg.graph().node(s).offset)
        .collect();
    assert_eq!(targets, vec![Some(4), Some(6)]);
    Ok(())
}

#[test]
fn classifies_vertex_roles() -> Result<()> {
    let code = [
        opcodes::GETSTATIC,
        0x00,
        0x01,
        opcodes::INVOKEVIRTUAL,
        0x00,
        0x02,
        opcodes::ATHROW,
    ];
    let cfg = cfg_of(&code, &[])?;
    let kinds: Vec<VertexKind> = cfg.graph().nodes().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            VertexKind::FieldAccess,
            VertexKind::Invoke,
            VertexKind::Exit,
            VertexKind::Entry,
            VertexKind::Exit,
        ]
    );
    // athrow leaves the method like a return does.
    let throw = cfg.node_at_offset(6).ok_or_else(|| anyhow::anyhow!("no node at 6"))?;
    assert_eq!(out_kinds(cfg.graph(), throw), vec![EdgeKind::Exit]);
    Ok(())
}

#[test]
fn switch_lists_cases_in_key_order_with_default_last() -> Result<()> {
    // tableswitch low=1 high=2, cases -> 24/26, default -> 28
    let mut code = vec![opcodes::TABLESWITCH, 0, 0, 0];
    for value in [28i32, 1, 2, 24, 26] {
        code.extend_from_slice(&value.to_be_bytes());
    }
    code.extend_from_slice(&[
        opcodes::ICONST_0,
        opcodes::IRETURN,
        opcodes::ICONST_1,
        opcodes::IRETURN,
        opcodes::ICONST_2,
        opcodes::IRETURN,
    ]);
    let cfg = cfg_of(&code, &[])?;
    let switch = cfg.node_at_offset(0).ok_or_else(|| anyhow::anyhow!("no node at 0"))?;
    assert_eq!(cfg.graph().node(switch).kind, VertexKind::Switch { cases: 3 });
    assert_eq!(
        out_kinds(cfg.graph(), switch),
        vec![
            EdgeKind::Case { key: 1 },
            EdgeKind::Case { key: 2 },
            EdgeKind::Default,
        ]
    );
    let targets: Vec<Option<u32>> = cfg
        .graph()
        .successors(switch)
        .map(|s| cfg.graph().node(s).offset)
        .collect();
    assert_eq!(targets, vec![Some(24), Some(26), Some(28)]);
    Ok(())
}

#[test]
fn emits_one_exceptional_edge_per_covering_handler() -> Result<()> {
    let code = [
        opcodes::ICONST_0,
        opcodes::ISTORE_1,
        opcodes::ICONST_1,
        opcodes::IRETURN,
        opcodes::ICONST_2,
        opcodes::IRETURN,
    ];
    let handler = ExceptionHandler {
        start: 0,
        end: 2,
        handler: 4,
        catch_type: 7,
    };
    let cfg = cfg_of(&code, &[handler])?;
    let target = cfg.node_at_offset(4).ok_or_else(|| anyhow::anyhow!("no node at 4"))?;
    let incoming: Vec<EdgeKind> = cfg
        .graph()
        .incoming(target)
        .iter()
        .map(|&e| cfg.graph().edge(e).kind)
        .collect();
    // Both protected instructions transfer; offset 2 is past the
    // exclusive range end and does not.
    assert_eq!(
        incoming,
        vec![
            EdgeKind::Exception { catch_type: 7 },
            EdgeKind::Exception { catch_type: 7 },
        ]
    );
    let uncovered = cfg.node_at_offset(2).ok_or_else(|| anyhow::anyhow!("no node at 2"))?;
    assert_eq!(out_kinds(cfg.graph(), uncovered), vec![EdgeKind::FallThrough]);
    Ok(())
}

#[test]
fn ret_contributes_no_out_edge() -> Result<()> {
    let code = [
        opcodes::JSR,
        0x00,
        0x04,
        opcodes::RETURN,
        opcodes::ASTORE_1,
        opcodes::RET,
        0x01,
    ];
    let cfg = cfg_of(&code, &[])?;
    let jsr = cfg.node_at_offset(0).ok_or_else(|| anyhow::anyhow!("no node at 0"))?;
    assert_eq!(out_kinds(cfg.graph(), jsr), vec![EdgeKind::Jump]);
    let ret = cfg.node_at_offset(5).ok_or_else(|| anyhow::anyhow!("no node at 5"))?;
    assert_eq!(cfg.graph().out_degree(ret), 0);
    // The return site is only reached through the unmodeled ret transfer.
    assert_eq!(cfg.find_unreachable_nodes(), vec![3]);
    Ok(())
}

#[test]
fn finds_instructions_skipped_by_a_jump() -> Result<()> {
    let code = [
        opcodes::GOTO,
        0x00,
        0x04,
        opcodes::ICONST_0,
        opcodes::RETURN,
    ];
    let cfg = cfg_of(&code, &[])?;
    assert_eq!(cfg.find_unreachable_nodes(), vec![3]);
    Ok(())
}

#[test]
fn rejects_branch_to_mid_instruction() -> Result<()> {
    let code = [opcodes::IFEQ, 0x00, 0x63, opcodes::RETURN];
    let instructions = decode(&code, 0, code.len())?;
    let err = ControlFlowGraph::build(&instructions, &[]).err();
    assert_eq!(
        err,
        Some(UnreachableTarget {
            at: 0,
            target: 99,
            origin: TargetOrigin::Branch,
        })
    );
    let err = err.ok_or_else(|| anyhow::anyhow!("expected an error"))?;
    assert_eq!(
        err.to_string(),
        "branch transfer at offset 0 targets 99, which is not an instruction start"
    );
    assert!(std::error::Error::source(&err).is_none());
    Ok(())
}

#[test]
fn rejects_fall_through_off_the_end() -> Result<()> {
    let instructions = decode(&[opcodes::ICONST_0], 0, 1)?;
    assert_eq!(
        ControlFlowGraph::build(&instructions, &[]).err(),
        Some(UnreachableTarget {
            at: 0,
            target: 1,
            origin: TargetOrigin::FallThrough,
        })
    );
    Ok(())
}

#[test]
fn rejects_handler_outside_code() -> Result<()> {
    let code = [opcodes::NOP, opcodes::NOP, opcodes::RETURN];
    let instructions = decode(&code, 0, code.len())?;
    let handler = ExceptionHandler {
        start: 0,
        end: 2,
        handler: 5,
        catch_type: 0,
    };
    assert_eq!(
        ControlFlowGraph::build(&instructions, &[handler]).err(),
        Some(UnreachableTarget {
            at: 0,
            target: 5,
            origin: TargetOrigin::Handler,
        })
    );
    Ok(())
}

#[test]
fn aggregates_straight_line_runs_into_blocks() -> Result<()> {
    let cfg = cfg_of(&BRANCHING, &[])?;
    let blocks = BlockGraph::from_cfg(&cfg);
    assert_eq!(blocks.size(), GraphSize { nodes: 5, edges: 5 });
    assert_eq!(blocks.members(NodeId(0)), &[NodeId(0), NodeId(1)]);
    assert_eq!(blocks.members(NodeId(1)), &[NodeId(2), NodeId(3)]);
    assert_eq!(blocks.members(NodeId(2)), &[NodeId(4), NodeId(5)]);
    assert_eq!(blocks.members(blocks.entry()), &[cfg.entry()]);
    assert_eq!(blocks.members(blocks.exit()), &[cfg.exit()]);
    assert_eq!(blocks.block_of(NodeId(1)), NodeId(0));
    assert_eq!(blocks.block_of(NodeId(4)), NodeId(2));

    // Offset of the first member, branching character of the last.
    let b0 = blocks.graph().node(NodeId(0));
    assert_eq!(b0.offset, Some(0));
    assert_eq!(b0.kind, VertexKind::Decision);
    assert_eq!(b0.label, "B0");
    assert_eq!(blocks.graph().node(NodeId(1)).offset, Some(4));

    insta::assert_snapshot!(dump(blocks.graph()), @r"
    entry -> B0 [entry]
    B0 -> B1 [fall-through]
    B0 -> B2 [taken]
    B1 -> exit [exit]
    B2 -> exit [exit]
    ");
    Ok(())
}

#[test]
fn block_edges_cover_every_cross_block_transfer() -> Result<()> {
    let cfg = cfg_of(&BRANCHING, &[])?;
    let blocks = BlockGraph::from_cfg(&cfg);
    let crossing: Vec<(NodeId, NodeId, EdgeKind)> = cfg
        .graph()
        .edges()
        .iter()
        .filter_map(|e| {
            let (bs, bt) = (blocks.block_of(e.source), blocks.block_of(e.target));
            (bs != bt).then_some((bs, bt, e.kind))
        })
        .collect();
    let lifted: Vec<(NodeId, NodeId, EdgeKind)> = blocks
        .graph()
        .edges()
        .iter()
        .map(|e| (e.source, e.target, e.kind))
        .collect();
    assert_eq!(crossing, lifted);
    Ok(())
}

#[test]
fn block_aggregation_preserves_loops() -> Result<()> {
    let cfg = cfg_of(&COUNTDOWN_LOOP, &[])?;
    let blocks = BlockGraph::from_cfg(&cfg);
    assert_eq!(blocks.size(), GraphSize { nodes: 5, edges: 5 });
    // iinc/goto form the body block, which jumps back to the header.
    assert_eq!(blocks.members(NodeId(1)), &[NodeId(2), NodeId(3)]);
    let back = blocks
        .graph()
        .edges()
        .iter()
        .find(|e| e.kind == EdgeKind::Jump)
        .ok_or_else(|| anyhow::anyhow!("no jump edge"))?;
    assert_eq!((back.source, back.target), (NodeId(1), NodeId(0)));
    Ok(())
}

#[test]
fn self_looping_jump_survives_aggregation() -> Result<()> {
    // A goto spinning on itself forms a single-instruction block whose
    // loop must stay visible at block granularity.
    let cfg = cfg_of(&[opcodes::GOTO, 0x00, 0x00], &[])?;
    let blocks = BlockGraph::from_cfg(&cfg);
    assert_eq!(blocks.size(), GraphSize { nodes: 3, edges: 2 });
    let looped = blocks.graph().edges()[1];
    assert_eq!((looped.source, looped.target), (NodeId(0), NodeId(0)));
    assert_eq!(looped.kind, EdgeKind::Jump);
    Ok(())
}

#[test]
fn block_internal_back_jump_becomes_self_loop() -> Result<()> {
    // nop; goto -> 0: both instructions land in one block whose tail
    // jumps back to its own head.
    let cfg = cfg_of(&[opcodes::NOP, opcodes::GOTO, 0xFF, 0xFF], &[])?;
    let blocks = BlockGraph::from_cfg(&cfg);
    assert_eq!(blocks.members(NodeId(0)), &[NodeId(0), NodeId(1)]);
    let back = blocks
        .graph()
        .edges()
        .iter()
        .find(|e| e.kind == EdgeKind::Jump)
        .ok_or_else(|| anyhow::anyhow!("no jump edge"))?;
    assert_eq!((back.source, back.target), (NodeId(0), NodeId(0)));
    // The fall-through chain edge inside the block stays elided.
    assert_eq!(blocks.graph().edge_count(), 2);
    Ok(())
}

#[test]
fn property_map_survives_aggregation() -> Result<()> {
    let mut cfg = cfg_of(&BRANCHING, &[])?;
    cfg.set_property("method", "Example.check(I)I");
    let blocks = BlockGraph::from_cfg(&cfg);
    assert_eq!(blocks.graph().property("method"), Some("Example.check(I)I"));
    Ok(())
}
