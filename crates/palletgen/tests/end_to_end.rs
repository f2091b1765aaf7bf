// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Snapshot in, Solidity out: generated encoders checked byte for byte
//! against parity-scale-codec.

use palletgen::codegen::{construct, eval_call, eval_codec};
use palletgen::{
    GenError, Generation, Generator, GeneratorConfig, SnapshotProvider, UnsupportedPolicy, Value,
};
use parity_scale_codec::{Compact, Encode};

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/westmint_subset.json"
);

// Reference types mirroring the fixture.

#[derive(Encode)]
enum MultiAddress {
    Id([u8; 32]),
    #[allow(dead_code)]
    Index(#[codec(compact)] u32),
}

#[derive(Encode)]
#[allow(dead_code)]
enum NetworkId {
    Polkadot,
    Kusama,
    Westend,
}

#[derive(Encode)]
#[allow(dead_code)]
enum Junction {
    Parachain(#[codec(compact)] u32),
    AccountId32 {
        network: Option<NetworkId>,
        id: [u8; 32],
    },
    PalletInstance(u8),
    GeneralIndex(#[codec(compact)] u128),
}

#[derive(Encode)]
#[allow(dead_code)]
enum Junctions {
    Here,
    X1(Junction),
    X2(Junction, Junction),
}

#[derive(Encode)]
struct Location {
    parents: u8,
    interior: Junctions,
}

#[derive(Encode)]
struct Weight {
    #[codec(compact)]
    ref_time: u64,
    #[codec(compact)]
    proof_size: u64,
}

#[derive(Encode)]
#[allow(dead_code)]
enum WeightLimit {
    Unlimited,
    Limited(Weight),
}

#[derive(Encode)]
struct Tree {
    value: u32,
    children: Vec<Tree>,
}

fn groups(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn generate_with(policy: UnsupportedPolicy, names: &[&str]) -> Result<Generation, GenError> {
    let config = GeneratorConfig::default()
        .with_metadata(FIXTURE)
        .with_policy(policy);
    Generator::new(config)?.generate(&SnapshotProvider::new(FIXTURE), &groups(names))
}

fn generate(names: &[&str]) -> Generation {
    generate_with(UnsupportedPolicy::Skip, names).unwrap()
}

#[test]
fn test_transfer_allow_death_matches_reference() {
    let generation = generate(&["Balances"]);
    let unit = generation.unit("Balances").unwrap();

    let bytes = eval_call(
        unit,
        "balances_transferAllowDeath",
        &[Value::Bytes(vec![0u8; 32]), Value::Uint(5_000_000)],
    )
    .unwrap();

    let reference = (
        10u8,
        0u8,
        MultiAddress::Id([0u8; 32]),
        Compact(5_000_000u128),
    )
        .encode();
    assert_eq!(bytes, reference);
    assert_eq!(
        hex::encode(&bytes),
        format!("0a00{}022d3101", "00".repeat(33))
    );
}

#[test]
fn test_call_index_prefix() {
    let generation = generate(&["Balances"]);
    let unit = generation.unit("Balances").unwrap();
    let bytes = eval_call(
        unit,
        "balances_transferAll",
        &[Value::Bytes(vec![7u8; 32]), Value::Bool(true)],
    )
    .unwrap();
    assert_eq!(&bytes[..2], &[10, 4]);
    assert_eq!(bytes[2], 0x00);
    assert_eq!(bytes.last(), Some(&0x01));
}

#[test]
fn test_xcm_arguments_match_reference() {
    let generation = generate(&["PolkadotXcm"]);
    let unit = generation.unit("PolkadotXcm").unwrap();

    let account = construct(
        unit,
        "Junction",
        "AccountId32",
        &[
            Value::option(Some(construct(unit, "NetworkId", "Westend", &[]).unwrap())),
            Value::Bytes(vec![0xab; 32]),
        ],
    )
    .unwrap();
    let parachain = construct(unit, "Junction", "parachain", &[Value::Uint(1000)]).unwrap();
    let interior = construct(unit, "Junctions", "X2", &[parachain, account]).unwrap();
    let dest = Value::record([("parents", Value::Uint(1)), ("interior", interior)]);

    let weight = Value::record([
        ("refTime", Value::Uint(1_000_000_000)),
        ("proofSize", Value::Uint(65_536)),
    ]);
    let limit = construct(unit, "WeightLimit", "Limited", &[weight]).unwrap();

    let bytes = eval_call(
        unit,
        "polkadotXcm_sendLimited",
        &[dest, limit, Value::option(Some(Value::Bool(false)))],
    )
    .unwrap();

    let reference = (
        31u8,
        1u8,
        Location {
            parents: 1,
            interior: Junctions::X2(
                Junction::Parachain(1000),
                Junction::AccountId32 {
                    network: Some(NetworkId::Westend),
                    id: [0xab; 32],
                },
            ),
        },
        WeightLimit::Limited(Weight {
            ref_time: 1_000_000_000,
            proof_size: 65_536,
        }),
        Some(false),
    )
        .encode();
    assert_eq!(bytes, reference);
}

#[test]
fn test_option_bool_matches_reference() {
    let generation = generate(&["PolkadotXcm"]);
    let unit = generation.unit("PolkadotXcm").unwrap();

    for flag in [None, Some(true), Some(false)] {
        let value = Value::option(flag.map(Value::Bool));
        let bytes = eval_codec(unit, "OptionBoolCodec", &value).unwrap();
        assert_eq!(bytes, flag.encode(), "{flag:?}");
    }
    let some_true = Value::option(Some(Value::Bool(true)));
    assert_eq!(
        hex::encode(eval_codec(unit, "OptionBoolCodec", &some_true).unwrap()),
        "0101"
    );

    let source = &generation.file("PolkadotXcmCallEncoder.sol").unwrap().contents;
    assert!(source.contains("return ScaleCodec.optionSome(ScaleCodec.boolean(v.value));"));
}

#[test]
fn test_gapped_enum_renumbered() {
    let generation = generate(&["PolkadotXcm"]);
    let unit = generation.unit("PolkadotXcm").unwrap();

    for (variant, tag) in [("Polkadot", 0u8), ("Kusama", 1), ("Westend", 2)] {
        let value = construct(unit, "NetworkId", variant, &[]).unwrap();
        assert_eq!(eval_codec(unit, "NetworkIdCodec", &value).unwrap(), [tag]);
    }
    assert_eq!(
        eval_codec(
            unit,
            "NetworkIdCodec",
            &construct(unit, "NetworkId", "Westend", &[]).unwrap()
        )
        .unwrap(),
        NetworkId::Westend.encode()
    );
}

#[test]
fn test_struct_field_order_preserved() {
    let generation = generate(&["PolkadotXcm"]);
    let unit = generation.unit("PolkadotXcm").unwrap();

    let weight = |a, b| Value::record([("refTime", Value::Uint(a)), ("proofSize", Value::Uint(b))]);
    let forward = eval_codec(unit, "WeightCodec", &weight(1, 64)).unwrap();
    let swapped = eval_codec(unit, "WeightCodec", &weight(64, 1)).unwrap();

    assert_eq!(
        forward,
        Weight {
            ref_time: 1,
            proof_size: 64
        }
        .encode()
    );
    assert_ne!(forward, swapped);
}

#[test]
fn test_recursive_type_declared_once() {
    let generation = generate(&["Demo"]);
    let source = &generation.file("DemoCallEncoder.sol").unwrap().contents;
    assert_eq!(source.matches("struct Tree {").count(), 1);
    assert_eq!(source.matches("library VecTreeCodec {").count(), 1);
    assert!(source.contains("    Tree[] children;"));

    let unit = generation.unit("Demo").unwrap();
    let leaf = |v| Value::record([("value", Value::Uint(v)), ("children", Value::List(vec![]))]);
    let tree = Value::record([
        ("value", Value::Uint(1)),
        ("children", Value::List(vec![leaf(2), leaf(3)])),
    ]);
    let bytes = eval_call(unit, "demo_plant", &[tree]).unwrap();

    let reference = (
        99u8,
        0u8,
        Tree {
            value: 1,
            children: vec![
                Tree {
                    value: 2,
                    children: vec![],
                },
                Tree {
                    value: 3,
                    children: vec![],
                },
            ],
        },
    )
        .encode();
    assert_eq!(bytes, reference);
}

#[test]
fn test_call_without_arguments() {
    let generation = generate(&["Demo"]);
    let source = &generation.file("DemoCallEncoder.sol").unwrap().contents;
    assert!(source.contains("function demo_ping() internal pure returns (bytes memory) {"));
    assert!(source.contains("return ScaleCodec.callIndex(99, 1);"));
    let unit = generation.unit("Demo").unwrap();
    assert_eq!(eval_call(unit, "demo_ping", &[]).unwrap(), [99, 1]);
}

#[test]
fn test_skip_policy_reports_argument() {
    let generation = generate(&["PolkadotXcm"]);
    let skipped = &generation.report.skipped;
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].qualified, "PolkadotXcm.claim");
    assert_eq!(skipped[0].args[0].name, "witness");
    assert_eq!(skipped[0].args[0].raw_type, "Lookup999");

    let source = &generation.file("PolkadotXcmCallEncoder.sol").unwrap().contents;
    assert!(source
        .contains("// Skipped PolkadotXcm.claim: unsupported arg types: witness:Lookup999"));
    assert!(!source.contains("function polkadotXcm_claim("));
    assert_eq!(
        generation.report.emitted,
        ["PolkadotXcm.set_location", "PolkadotXcm.send_limited"]
    );
}

#[test]
fn test_fail_policy_aborts() {
    let err = generate_with(UnsupportedPolicy::Fail, &["PolkadotXcm"]).unwrap_err();
    match err {
        GenError::UnsupportedArgument {
            call,
            arg,
            raw_type,
            ..
        } => {
            assert_eq!(call, "PolkadotXcm.claim");
            assert_eq!(arg, "witness");
            assert_eq!(raw_type, "Lookup999");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Groups without unsupported arguments are unaffected.
    assert!(generate_with(UnsupportedPolicy::Fail, &["Balances"]).is_ok());
}

#[test]
fn test_calls_contract_order() {
    let generation = generate(&["demo", "Balances", "System", "PolkadotXcm"]);
    let contract = &generation.file("PalletCalls.sol").unwrap().contents;

    let position = |member: &str| contract.find(&format!("        {member}")).unwrap();
    assert!(position("system_remark") < position("balances_transferAllowDeath"));
    assert!(position("balances_transferAllowDeath") < position("balances_forceTransfer"));
    assert!(position("polkadotXcm_claim") < position("demo_plant"));
    assert!(contract.contains("return (10, 2); // Balances.force_transfer"));

    let names: Vec<&str> = generation.report.files.iter().map(String::as_str).collect();
    assert_eq!(
        names,
        [
            "SystemCallEncoder.sol",
            "BalancesCallEncoder.sol",
            "PolkadotXcmCallEncoder.sol",
            "DemoCallEncoder.sol",
            "PalletCalls.sol",
            "ScaleCodec.sol",
        ]
    );
}

#[test]
fn test_generation_is_idempotent() {
    let all = ["System", "Balances", "PolkadotXcm", "Demo"];
    let first = generate(&all);
    let second = generate(&all);
    assert_eq!(first.files, second.files);
}

#[test]
fn test_header_names_runtime() {
    let generation = generate(&["System"]);
    for file in &generation.files {
        assert!(
            file.contents
                .starts_with("// Auto-generated from Westend Asset Hub (westmint v1018000)"),
            "{}",
            file.path.display()
        );
    }
}

#[test]
fn test_unknown_group_only_is_fatal() {
    let err = generate_with(UnsupportedPolicy::Skip, &["Assets"]).unwrap_err();
    assert!(matches!(err, GenError::UnknownCallGroup(_)));

    let generation = generate(&["Assets", "System"]);
    assert_eq!(generation.report.unknown_groups, ["Assets"]);
    assert_eq!(generation.report.groups, ["System"]);
}

#[test]
fn test_write_all_creates_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("contracts").join("generated");
    let generation = generate(&["Balances"]);
    generation.write_all(&out).unwrap();

    let written = std::fs::read_to_string(out.join("BalancesCallEncoder.sol")).unwrap();
    assert_eq!(
        written,
        generation.file("BalancesCallEncoder.sol").unwrap().contents
    );
}
