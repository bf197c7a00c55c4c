use energygrid_aggregator::serial::{generate_serial_numbers, partition, SerialError};
use energygrid_aggregator::SerialNumber;

#[test]
fn partition_laws_hold_across_sizes() {
    for total in [0, 1, 9, 10, 11, 25, 500] {
        for batch_size in [1, 3, 10, 600] {
            let serials = generate_serial_numbers(total);
            let batches = partition(serials.clone(), batch_size).unwrap();

            assert_eq!(batches.len(), total.div_ceil(batch_size), "{total}/{batch_size}");
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= batch_size));
            if let Some((last, rest)) = batches.split_last() {
                assert!(rest.iter().all(|b| b.len() == batch_size));
                assert_eq!(last.last_index(), total - 1);
            }

            let flattened: Vec<SerialNumber> = batches
                .iter()
                .flat_map(|b| b.serial_numbers().iter().cloned())
                .collect();
            assert_eq!(flattened, serials);
        }
    }
}

#[test]
fn batches_are_numbered_from_one_with_fleet_offsets() {
    let batches = partition(generate_serial_numbers(25), 10).unwrap();
    let shape: Vec<(usize, usize, usize)> = batches
        .iter()
        .map(|b| (b.number(), b.offset(), b.len()))
        .collect();
    assert_eq!(shape, vec![(1, 0, 10), (2, 10, 10), (3, 20, 5)]);
}

#[test]
fn zero_batch_size_is_rejected() {
    assert_eq!(
        partition(generate_serial_numbers(5), 0).unwrap_err(),
        SerialError::InvalidBatchSize(0)
    );
}

#[test]
fn serials_are_unique_and_zero_padded() {
    let serials = generate_serial_numbers(1001);
    assert_eq!(serials[0].as_str(), "SN-000");
    assert_eq!(serials[499].as_str(), "SN-499");
    assert_eq!(serials[1000].as_str(), "SN-1000");

    let mut unique: Vec<&str> = serials.iter().map(SerialNumber::as_str).collect();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), serials.len());
}
