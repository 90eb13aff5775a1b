#![no_main]

use std::collections::VecDeque;

use bytepool::{Buffer, BufferConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Tiny growth hint so compaction and reallocation happen constantly
    let mut buf = Buffer::with_config(BufferConfig::new(0, 8).unwrap());
    let mut model: VecDeque<u8> = VecDeque::new();

    for op in data.chunks(2) {
        let (kind, arg) = (op[0] % 6, *op.get(1).unwrap_or(&0) as usize);
        match kind {
            0 => {
                let payload: Vec<u8> = (0..arg).map(|i| i as u8).collect();
                buf.write(&payload).unwrap();
                model.extend(payload);
            }
            1 => {
                let mut dst = vec![0u8; arg];
                if let Ok(n) = buf.read(&mut dst) {
                    let expected: Vec<u8> = model.drain(..n).collect();
                    assert_eq!(&dst[..n], &expected[..]);
                } else {
                    assert!(model.is_empty());
                }
            }
            2 => {
                let n = buf.discard(arg);
                assert_eq!(n, arg.min(model.len()));
                model.drain(..n);
            }
            3 => {
                if arg > 0 {
                    let used = arg / 2;
                    let region = buf.borrow(arg).unwrap();
                    assert_eq!(region.len(), arg);
                    region.fill(0xee);
                    buf.give_back(used).unwrap();
                    model.extend(std::iter::repeat_n(0xee, used));
                }
            }
            4 => {
                if let Ok(line) = buf.read_bytes(arg as u8) {
                    let expected: Vec<u8> = model.drain(..line.len()).collect();
                    assert_eq!(&line[..], &expected[..]);
                    assert!(line.last() == Some(&(arg as u8)) || model.is_empty());
                }
            }
            _ => {
                buf.reset().unwrap();
                model.clear();
            }
        }

        assert_eq!(buf.len(), model.len());
        assert!(!buf.borrowing());
    }

    let (front, back) = model.as_slices();
    assert_eq!(&buf.clone_bytes()[..], &[front, back].concat()[..]);
});
