use std::collections::HashSet;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn try_parse(smiles: &str) -> Option<ringcrab::Mol<ringcrab::Atom, ringcrab::Bond>> {
    match ringcrab::from_smiles(smiles) {
        Ok(m) => Some(m),
        Err(e) => {
            eprintln!("SKIP (parse failure): {smiles:?}: {e}");
            None
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// 1. Extended SSSR
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RingEntry {
    name: String,
    smiles: String,
    ring_sizes: Vec<usize>,
    num_sssr: usize,
    num_ring_atoms: usize,
    num_ring_bonds: usize,
}

#[test]
fn approval_extended_sssr() {
    init_tracing();
    let data: Vec<RingEntry> =
        serde_json::from_str(include_str!("approval_data/rings.json")).unwrap();

    let mut failures = Vec::new();
    let mut skipped = 0usize;
    for entry in &data {
        let mut mol = match try_parse(&entry.smiles) {
            Some(m) => m,
            None => { skipped += 1; continue; }
        };
        let esssr = ringcrab::extended_sssr(&mut mol, false);

        let mut got_sizes: Vec<usize> = esssr.iter().map(|r| r.size()).collect();
        got_sizes.sort();
        let mut expected_sizes = entry.ring_sizes.clone();
        expected_sizes.sort();
        if got_sizes != expected_sizes {
            failures.push(format!(
                "[ring_sizes] {} ({}): expected {:?}, got {:?}",
                entry.name, entry.smiles, expected_sizes, got_sizes
            ));
        }

        let num_sssr = esssr.sssr(&mol).len();
        if num_sssr != entry.num_sssr {
            failures.push(format!(
                "[sssr] {} ({}): expected {}, got {}",
                entry.name, entry.smiles, entry.num_sssr, num_sssr
            ));
        }

        let ring_atoms: HashSet<usize> = esssr
            .iter()
            .flat_map(|r| r.atoms().iter().map(|n| n.index()))
            .collect();
        if ring_atoms.len() != entry.num_ring_atoms {
            failures.push(format!(
                "[ring_atoms] {} ({}): expected {}, got {}",
                entry.name,
                entry.smiles,
                entry.num_ring_atoms,
                ring_atoms.len()
            ));
        }

        let ring_bonds = mol.bonds().filter(|&b| esssr.is_ring_bond(b)).count();
        if ring_bonds != entry.num_ring_bonds {
            failures.push(format!(
                "[ring_bonds] {} ({}): expected {}, got {}",
                entry.name, entry.smiles, entry.num_ring_bonds, ring_bonds
            ));
        }
    }

    if skipped > 0 {
        eprintln!("extended sssr: skipped {skipped} unparseable molecules");
    }

    if !failures.is_empty() {
        panic!(
            "{} ring failures:\n{}",
            failures.len(),
            failures.join("\n")
        );
    }
}

// ---------------------------------------------------------------------------
// 2. Pi-electron systems
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PiSystemEntry {
    name: String,
    smiles: String,
    /// `[num_atoms, num_electrons]` per system, in perception order.
    systems: Vec<[usize; 2]>,
}

#[test]
fn approval_pi_systems() {
    init_tracing();
    let data: Vec<PiSystemEntry> =
        serde_json::from_str(include_str!("approval_data/pi_systems.json")).unwrap();

    let mut failures = Vec::new();
    let mut skipped = 0usize;
    for entry in &data {
        let mut mol = match try_parse(&entry.smiles) {
            Some(m) => m,
            None => { skipped += 1; continue; }
        };
        let systems = ringcrab::pi_electron_systems(&mut mol, false);

        let got: Vec<[usize; 2]> = systems
            .iter()
            .map(|s| [s.num_atoms(), s.num_electrons()])
            .collect();
        if got != entry.systems {
            failures.push(format!(
                "[systems] {} ({}): expected {:?}, got {:?}",
                entry.name, entry.smiles, entry.systems, got
            ));
        }
    }

    if skipped > 0 {
        eprintln!("pi systems: skipped {skipped} unparseable molecules");
    }

    if !failures.is_empty() {
        panic!(
            "{} pi-system failures:\n{}",
            failures.len(),
            failures.join("\n")
        );
    }
}
