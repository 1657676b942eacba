//! Value codec throughput.

use alloy_primitives::{Address, U256};
use chainclassify_core::types::{AbiType, DecodedValue};
use chainclassify_evm::{decode_call, encode_call, InterfaceRegistry};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const ABI: &str = r#"[
    {"type": "function", "name": "transfer", "inputs": [
        {"name": "to", "type": "address"}, {"name": "value", "type": "uint256"}
    ]},
    {"type": "function", "name": "batch", "inputs": [
        {"name": "recipients", "type": "address[]"}, {"name": "memos", "type": "string[]"}
    ]}
]"#;

fn bench_decode(c: &mut Criterion) {
    let reg = InterfaceRegistry::from_json(ABI).unwrap();

    let transfer = reg.function_by_signature("transfer(address,uint256)").unwrap();
    let transfer_data = encode_call(
        transfer,
        &[
            DecodedValue::Address(Address::repeat_byte(0x11)),
            DecodedValue::Uint(U256::from(42u64)),
        ],
    )
    .unwrap();

    let batch = reg.function_by_signature("batch(address[],string[])").unwrap();
    let n = 64;
    let batch_data = encode_call(
        batch,
        &[
            DecodedValue::Array(vec![DecodedValue::Address(Address::repeat_byte(0x22)); n]),
            DecodedValue::Array(vec![DecodedValue::String("memo".repeat(12)); n]),
        ],
    )
    .unwrap();

    c.bench_function("decode_transfer", |b| {
        b.iter(|| decode_call(black_box(&transfer_data), &reg).unwrap())
    });
    c.bench_function("decode_batch_64", |b| {
        b.iter(|| decode_call(black_box(&batch_data), &reg).unwrap())
    });
    c.bench_function("validate_types", |b| {
        let ty = AbiType::Array(Box::new(AbiType::Uint(256)));
        b.iter(|| black_box(&ty).validate().unwrap())
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
