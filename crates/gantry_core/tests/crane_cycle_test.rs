//! Integration tests for the crane cycle driven through the engine handle.

use gantry_core::{Axis, BlockId, Cell, Engine, FixedPicker, Layout, ParentSpace, Phase};

const FRAME: f32 = 1.0 / 60.0;

fn fixed_engine(k: usize) -> Engine {
    Engine::with_picker(&Layout::default(), Box::new(FixedPicker::new(k))).unwrap()
}

/// Every actuator value and block position, bit for bit.
fn snapshot(engine: &Engine) -> Vec<u32> {
    let mut bits: Vec<u32> = Axis::ALL
        .iter()
        .map(|&axis| engine.axis_value(axis).to_bits())
        .collect();
    for block in engine.grid().blocks() {
        let position = engine.block_world_position(block.id()).unwrap();
        bits.extend(position.to_array().iter().map(|v| v.to_bits()));
    }
    bits
}

fn carried_count(engine: &Engine) -> usize {
    engine.grid().blocks().iter().filter(|b| b.is_carried()).count()
}

#[test]
fn test_first_cycle_swaps_into_the_hole() {
    let mut engine = fixed_engine(0);
    assert_eq!(engine.grid().empty_cell(), Cell::new(1, 1));

    while engine.stats().cycles == 0 {
        engine.advance(FRAME);
    }

    assert_eq!(engine.grid().empty_cell(), Cell::new(0, 0));
    assert_eq!(engine.grid().block_at(Cell::new(1, 1)), Some(BlockId(0)));
    assert_eq!(engine.block_parent_space(BlockId(0)), Some(ParentSpace::Grid));
    assert_eq!(engine.phase(), Phase::MoveToPick);
}

#[test]
fn test_identical_runs_are_bit_identical() {
    let mut a = Engine::init(&Layout::default()).unwrap();
    let mut b = Engine::init(&Layout::default()).unwrap();

    for frame in 0..3_000u32 {
        // Uneven cadence, identical for both engines
        let delta = FRAME * (0.5 + (frame % 7) as f32 * 0.25);
        assert_eq!(a.advance(delta), b.advance(delta));
        assert_eq!(snapshot(&a), snapshot(&b), "diverged at frame {frame}");
        assert_eq!(a.current_move(), b.current_move());
    }
    assert!(a.stats().cycles > 0);
}

#[test]
fn test_frame_cadence_does_not_change_motion() {
    let mut smooth = fixed_engine(4);
    let mut choppy = fixed_engine(4);

    for _ in 0..600 {
        smooth.advance(FRAME);
    }
    for _ in 0..20 {
        choppy.advance(0.5);
    }

    assert_eq!(smooth.stats().ticks, 600);
    assert_eq!(choppy.stats().ticks, 600);
    assert_eq!(snapshot(&smooth), snapshot(&choppy));
    assert_eq!(smooth.phase(), choppy.phase());
    assert_eq!(smooth.progress(), choppy.progress());
}

#[test]
fn test_grid_stays_consistent_over_many_cycles() {
    let mut layout = Layout::default();
    layout.seed = 2024;
    let mut engine = Engine::init(&layout).unwrap();

    for _ in 0..(60 * 180) {
        engine.advance(FRAME);
        assert!(engine.grid().occupancy_is_consistent());
        assert!(carried_count(&engine) <= 1);
    }
    assert!(engine.stats().cycles >= 100, "only {} cycles", engine.stats().cycles);
}

#[test]
fn test_resting_blocks_sit_exactly_on_their_cells() {
    let mut engine = fixed_engine(6);
    let mut cycles = 0;

    while cycles < 20 {
        engine.advance(FRAME);
        if engine.stats().cycles == cycles {
            continue;
        }
        cycles = engine.stats().cycles;

        let grid = engine.grid();
        assert_eq!(carried_count(&engine), 0);
        for block in grid.blocks() {
            assert_eq!(block.parent(), ParentSpace::Grid);
            assert_eq!(block.local_position(), grid.rest_position(block.cell()));
        }
    }
}

#[test]
fn test_blocks_move_only_with_their_parent() {
    let mut engine = fixed_engine(2);
    let mut parents: Vec<ParentSpace> = engine
        .grid()
        .blocks()
        .iter()
        .map(|b| b.parent())
        .collect();
    let mut positions: Vec<_> = engine
        .grid()
        .blocks()
        .iter()
        .map(|b| engine.block_world_position(b.id()).unwrap())
        .collect();
    let mut hook = engine.chain().world_position(Axis::Hook);
    let mut attaches = 0;
    let mut detaches = 0;
    let mut carried_ticks = 0;

    // One tick per frame so each frame brackets at most one handoff
    for _ in 0..(60 * 20) {
        engine.advance(engine.step_secs() + 1e-6);
        let hook_now = engine.chain().world_position(Axis::Hook);
        let hook_moved = hook_now - hook;

        for (index, block) in engine.grid().blocks().iter().enumerate() {
            let position = engine.block_world_position(block.id()).unwrap();
            let moved = position - positions[index];

            match (parents[index], block.parent()) {
                (ParentSpace::Grid, ParentSpace::Grid) => {
                    assert_eq!(moved.length(), 0.0, "resting {} moved", block.id());
                }
                (ParentSpace::Hook, ParentSpace::Hook) => {
                    carried_ticks += 1;
                    let error = moved.distance(hook_moved);
                    assert!(error < 1e-4, "{} drifted {error} from the hook", block.id());
                }
                (ParentSpace::Grid, ParentSpace::Hook) => {
                    attaches += 1;
                    let jump = moved.length();
                    assert!(jump < 1e-5, "attach moved {} by {jump}", block.id());
                }
                (ParentSpace::Hook, ParentSpace::Grid) => {
                    detaches += 1;
                    let jump = moved.length();
                    assert!(jump < 0.05, "detach moved {} by {jump}", block.id());
                }
            }

            parents[index] = block.parent();
            positions[index] = position;
        }
        hook = hook_now;
    }

    assert!(attaches > 0 && detaches > 0);
    assert!(carried_ticks > 0);
}

#[test]
fn test_five_second_frame_catches_up() {
    let mut engine = fixed_engine(0);
    let step = std::time::Duration::from_secs_f32(engine.step_secs());

    let ticks = engine.advance(5.0);

    assert_eq!(ticks, 300);
    assert!(u128::from(ticks) <= std::time::Duration::from_secs(5).as_nanos() / step.as_nanos());
    assert_eq!(engine.stats().ticks, 300);
    assert!(engine.stats().cycles >= 3);
}

#[test]
fn test_stopped_engine_is_frozen() {
    let mut engine = fixed_engine(1);
    engine.advance(0.75);
    let before = snapshot(&engine);

    engine.stop();
    for _ in 0..100 {
        engine.advance(FRAME);
    }

    assert_eq!(snapshot(&engine), before);
    assert!(engine.is_stopped());
}
