/*!
 * Descriptor Table Property Tests
 * Allocation-reuse policy over the public table API
 */

use mono_os_kernel::{Errno, FdTable, NullStream, Stream};

fn null() -> Box<dyn Stream> {
    Box::new(NullStream)
}

#[test]
fn test_release_then_allocate_returns_same_handle() {
    let table = FdTable::new();
    let handles: Vec<usize> = (0..5).map(|_| table.allocate_with(null())).collect();
    assert_eq!(handles, vec![0, 1, 2, 3, 4]);

    // Any released non-zero index is the next handle handed out
    for k in [3usize, 1, 4] {
        table.release(k).unwrap();
        assert_eq!(table.allocate_with(null()), k);
    }
}

#[test]
fn test_slot_zero_is_the_exception() {
    let table = FdTable::new();
    for _ in 0..3 {
        table.allocate_with(null());
    }

    table.release(0).unwrap();
    // Slot 0 scans as "not found": the table appends instead of reusing
    assert_eq!(table.allocate_with(null()), 3);
    assert_eq!(table.allocate_with(null()), 4);
    assert!(!table.is_open(0));
}

#[test]
fn test_lookup_never_returns_a_stale_entry() {
    let table = FdTable::new();
    let fd = table.allocate_with(null());
    table.release(fd).unwrap();

    assert_eq!(table.with_entry(fd, |_| ()).err(), Some(Errno::EBADF));
    assert_eq!(table.with_entry(fd + 100, |_| ()).err(), Some(Errno::EBADF));
    assert_eq!(table.release(fd).err(), Some(Errno::EBADF));
}

#[test]
fn test_table_grows_but_never_shrinks() {
    let table = FdTable::new();
    for _ in 0..8 {
        table.allocate_with(null());
    }
    assert_eq!(table.len(), 8);

    for fd in 1..8 {
        table.release(fd).unwrap();
    }
    assert_eq!(table.len(), 8);
}
