use super::types::{Configuration, Species};

/// Maps a configuration with arbitrary species labels onto the dense index
/// range `[0, S)` that the rank arithmetic operates on.
///
/// Returns the pack table (the distinct labels in ascending order) together
/// with the packed configuration; `packed[site]` is the position of the
/// original label in the table. Sorting the table keeps lexicographic
/// enumeration of packed configurations consistent with label order.
pub fn pack_configuration(configuration: &[Species]) -> (Vec<Species>, Configuration) {
    let mut pack_indices: Vec<Species> = configuration.to_vec();
    pack_indices.sort_unstable();
    pack_indices.dedup();

    let packed = configuration
        .iter()
        .map(|label| pack_indices.binary_search(label).unwrap() as Species)
        .collect();
    (pack_indices, packed)
}

/// Restores the original species labels of a packed configuration.
pub fn unpack_configuration(pack_indices: &[Species], packed: &[Species]) -> Configuration {
    packed
        .iter()
        .map(|&index| pack_indices[index as usize])
        .collect()
}
