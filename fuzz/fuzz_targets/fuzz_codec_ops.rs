//! Fuzz target for codec operation sequences.
//!
//! Applies arbitrary operations to every codec and to a `Vec` model, and
//! panics as soon as a column disagrees with the model.

#![no_main]

use arbitrary::Arbitrary;
use colpack_core::{
    ColumnIdentity, CompressedColumn, DeltaColumn, DictionaryColumn, ElementType, RleColumn, Value,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(i16),
    Update(u8, i16),
    UpdateMany(Vec<u8>, i16),
    Remove(u8),
    RemoveMany(Vec<u8>),
    Clear,
}

fn model_apply(model: &mut Vec<i16>, op: &Op) -> bool {
    let len = model.len();
    let in_range = move |t: &u8| usize::from(*t) < len;
    match op {
        Op::Insert(v) => {
            model.push(*v);
            true
        }
        Op::Update(t, v) if in_range(t) => {
            model[usize::from(*t)] = *v;
            true
        }
        Op::UpdateMany(ts, v) if ts.iter().all(in_range) => {
            for t in ts {
                model[usize::from(*t)] = *v;
            }
            true
        }
        Op::Remove(t) if in_range(t) => {
            model.remove(usize::from(*t));
            true
        }
        Op::RemoveMany(ts)
            if !ts.is_empty() && ts.windows(2).all(|w| w[0] < w[1]) && ts.iter().all(in_range) =>
        {
            for t in ts.iter().rev() {
                model.remove(usize::from(*t));
            }
            true
        }
        Op::Clear => {
            model.clear();
            true
        }
        _ => false,
    }
}

fn column_apply(column: &mut dyn CompressedColumn<Element = i32>, op: &Op) -> bool {
    let tids = |ts: &[u8]| ts.iter().map(|&t| usize::from(t)).collect::<Vec<_>>();
    match op {
        Op::Insert(v) => column.insert_value(&Value::Int32(i32::from(*v))).is_ok(),
        Op::Update(t, v) => column
            .update(usize::from(*t), &Value::Int32(i32::from(*v)))
            .is_ok(),
        Op::UpdateMany(ts, v) => column
            .update_many(&tids(ts), &Value::Int32(i32::from(*v)))
            .is_ok(),
        Op::Remove(t) => column.remove(usize::from(*t)).is_ok(),
        Op::RemoveMany(ts) => column.remove_many(&tids(ts)).is_ok(),
        Op::Clear => {
            column.clear_content();
            true
        }
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let Ok(identity) = ColumnIdentity::new("fuzz", ElementType::Int32) else {
        return;
    };
    let (Ok(delta), Ok(dict), Ok(rle)) = (
        DeltaColumn::<i32>::new(identity.clone()),
        DictionaryColumn::<i32>::new(identity.clone()),
        RleColumn::<i32>::new(identity),
    ) else {
        return;
    };
    let mut columns: Vec<Box<dyn CompressedColumn<Element = i32>>> =
        vec![Box::new(delta), Box::new(dict), Box::new(rle)];

    let mut model: Vec<i16> = Vec::new();
    for op in &ops {
        let expected = model_apply(&mut model, op);
        let widened: Vec<i32> = model.iter().map(|&v| i32::from(v)).collect();
        for column in &mut columns {
            let ok = column_apply(column.as_mut(), op);
            assert_eq!(ok, expected, "{} diverged on {op:?}", column.encoding());
            assert_eq!(column.decode_all(), widened, "{}", column.encoding());
        }
    }
});
