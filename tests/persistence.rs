//! On-disk labeled-graph lifecycle: build once, reopen, re-prove.

mod common;
use common::fixtures::{setup, temp_graph_path, TEST_PK, TEST_SEED};

use pospace::{Prover, TreeGeometry};

#[test]
fn test_build_reopen_and_prove_from_disk() {
    let path = temp_graph_path("reopen");
    let _ = std::fs::remove_file(&path);

    let commitment = {
        let mut prover = Prover::new(&TEST_PK, 2, &path).unwrap();
        prover.init().unwrap()
    };

    // reopening skips the build; the commitment reads back from the root slot
    let mut reopened = Prover::new(&TEST_PK, 2, &path).unwrap();
    let reread = reopened.pre_init().unwrap();
    assert_eq!(commitment, reread);

    let verifier =
        pospace::Verifier::new(&TEST_PK, 2, 2, reread.commit).unwrap();
    let challenges = verifier.select_challenges(&TEST_SEED);
    let answer = reopened.prove_space(&challenges).unwrap();
    assert!(verifier.verify_space(&challenges, &answer));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_rebuild_is_byte_identical() {
    let path_a = temp_graph_path("idempotence_a");
    let path_b = temp_graph_path("idempotence_b");
    let _ = std::fs::remove_file(&path_a);
    let _ = std::fs::remove_file(&path_b);

    for path in [&path_a, &path_b] {
        let mut prover = Prover::new(&TEST_PK, 2, path).unwrap();
        prover.init().unwrap();
    }

    let bytes_a = std::fs::read(&path_a).unwrap();
    let bytes_b = std::fs::read(&path_b).unwrap();
    assert_eq!(bytes_a, bytes_b);

    let geometry = TreeGeometry::new(2).unwrap();
    assert_eq!(bytes_a.len() as i64, geometry.slots() * 32);

    std::fs::remove_file(&path_a).unwrap();
    std::fs::remove_file(&path_b).unwrap();
}

#[test]
fn test_disk_and_memory_builds_agree() {
    let path = temp_graph_path("disk_vs_memory");
    let _ = std::fs::remove_file(&path);

    let mut on_disk = Prover::new(&TEST_PK, 2, &path).unwrap();
    let disk_commit = on_disk.init().unwrap();

    let in_memory = setup(2, 2);
    assert_eq!(disk_commit, in_memory.commitment);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_wrong_sized_file_is_rejected() {
    let path = temp_graph_path("wrong_size");
    std::fs::write(&path, vec![0u8; 123]).unwrap();

    assert!(Prover::new(&TEST_PK, 2, &path).is_err());

    std::fs::remove_file(&path).unwrap();
}
