// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::float_cmp)] // Test assertions with constants

//! Randomized round-trips: descriptors and partially-set records.

use hdds_record::descriptor::{boolean, float, int, list_of, pair_of, result_of, string, view};
use hdds_record::{declare, json, Descriptor};
use serde_json::Value;
use std::fmt::Debug;

const ITERATIONS: usize = 200;

fn roundtrip<V: PartialEq + Debug + 'static>(desc: &Descriptor<V>, value: V) {
    let encoded = desc.to_json(&value);
    let decoded = desc.from_json(&encoded);
    assert_eq!(decoded, Ok(value), "{} via {}", desc.name(), encoded);
}

fn random_string(rng: &mut fastrand::Rng) -> String {
    let len = rng.usize(0..12);
    (0..len).map(|_| rng.alphanumeric()).collect()
}

#[test]
fn test_descriptor_roundtrips() {
    let mut rng = fastrand::Rng::with_seed(0x4844_4453);
    let ints = list_of(&int());
    let entry = pair_of("key", &string(), "enabled", &boolean());
    let outcome = result_of(&float(), &string());
    let even = view(
        "even",
        |n: i64| if n % 2 == 0 { Ok(n) } else { Err(format!("{} is odd", n)) },
        |n: &i64| *n,
        &int(),
    );

    for _ in 0..ITERATIONS {
        roundtrip(&int(), rng.i64(..));
        roundtrip(&boolean(), rng.bool());
        roundtrip(&string(), random_string(&mut rng));
        roundtrip(&float(), rng.f64() * 1e6);

        let n = rng.usize(0..8);
        roundtrip(&ints, (0..n).map(|_| rng.i64(-1000..1000)).collect());
        roundtrip(&entry, (random_string(&mut rng), rng.bool()));

        let value = if rng.bool() {
            Ok(rng.f64())
        } else {
            Err(random_string(&mut rng))
        };
        roundtrip(&outcome, value);
        roundtrip(&even, rng.i64(-500..500) * 2);
    }
}

#[test]
fn test_record_subset_roundtrip() {
    let mut rng = fastrand::Rng::with_seed(7400);

    let layout = declare("sample");
    let id = layout.field("id", &int()).expect("id");
    let label = layout.field("label", &string()).expect("label");
    let ratio = layout.field("ratio", &float()).expect("ratio");
    let tags = layout.field("tags", &list_of(&string())).expect("tags");
    let active = layout.field("active", &boolean()).expect("active");
    layout.seal();

    for _ in 0..ITERATIONS {
        let mut record = layout.allocate().expect("allocate");
        let mask: Vec<bool> = (0..5).map(|_| rng.bool()).collect();

        if mask[0] {
            record.set(&id, rng.i64(..)).expect("id");
        }
        if mask[1] {
            record.set(&label, random_string(&mut rng)).expect("label");
        }
        if mask[2] {
            record.set(&ratio, rng.f64()).expect("ratio");
        }
        if mask[3] {
            let n = rng.usize(0..4);
            record
                .set(&tags, (0..n).map(|_| random_string(&mut rng)).collect())
                .expect("tags");
        }
        if mask[4] {
            record.set(&active, rng.bool()).expect("active");
        }

        let encoded = json::encode(&record);
        let keys = encoded.as_object().map(|o| o.len()).unwrap_or(0);
        assert_eq!(keys, mask.iter().filter(|m| **m).count());

        let text = json::to_string(&record);
        let decoded = json::from_str(&layout, &text).expect("decode");

        assert_eq!(decoded.is_set(&id).expect("id"), mask[0]);
        assert_eq!(decoded.is_set(&label).expect("label"), mask[1]);
        assert_eq!(decoded.is_set(&ratio).expect("ratio"), mask[2]);
        assert_eq!(decoded.is_set(&tags).expect("tags"), mask[3]);
        assert_eq!(decoded.is_set(&active).expect("active"), mask[4]);
        assert_eq!(decoded.set_count(), record.set_count());
        assert_eq!(decoded.try_get(&id).expect("id"), record.try_get(&id).expect("id"));
        assert_eq!(
            decoded.try_get(&ratio).expect("ratio"),
            record.try_get(&ratio).expect("ratio")
        );
        assert_eq!(decoded, record);
    }
}

#[test]
fn test_unknown_keys_do_not_affect_decoded_fields() {
    let layout = declare("sample");
    let id = layout.field("id", &int()).expect("id");
    layout.seal();

    let mut input = serde_json::Map::new();
    input.insert("id".into(), Value::from(9));
    input.insert("extra".into(), Value::from("ignored"));

    let record = json::decode(&layout, &Value::Object(input)).expect("decode");
    assert_eq!(*record.get(&id).expect("id"), 9);
    assert_eq!(json::to_string(&record), r#"{"id":9}"#);
}
