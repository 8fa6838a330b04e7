use corvid_buffer::buffer::{Buffer, BufferKind};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decstbm_random_ops_do_not_panic(
        width in 2usize..15,
        height in 2usize..15,
        actions in prop::collection::vec(0u8..=255, 10..200),
    ) {
        let mut buf = Buffer::new(width, height, BufferKind::Primary, 50);

        // Warm up the buffer with some content.
        for _ in 0..height {
            buf.insert_text(&"X".repeat(width.clamp(1, 6)));
            buf.index();
            buf.carriage_return();
        }

        for a in actions {
            let top = a as usize % height;
            let bottom = (a as usize * 3) % height;

            if top < bottom {
                buf.set_scroll_region(top, bottom);
            } else {
                buf.set_scroll_region(0, height - 1);
            }

            match a % 8 {
                0 => buf.index(),
                1 => buf.reverse_index(),
                2 => buf.next_line(),
                3 => buf.insert_lines((a as usize % 3) + 1),
                4 => buf.delete_lines((a as usize % 3) + 1),
                5 => buf.scroll_up((a as usize % 3) + 1),
                6 => buf.scroll_down((a as usize % 3) + 1),
                7 => buf.insert_text("ab"),
                _ => unreachable!(),
            }

            // Cursor stays on the screen no matter what.
            prop_assert!(buf.cursor().pos.y < height);
            prop_assert!(buf.cursor().pos.x <= width);
        }

        prop_assert_eq!(buf.visible_rows().len(), height);
    }

    #[test]
    fn resize_random_sizes_do_not_panic(
        sizes in prop::collection::vec((1usize..40, 1usize..40), 1..20),
        text in "[ -~]{0,80}",
    ) {
        let mut buf = Buffer::new(10, 5, BufferKind::Primary, 20);
        buf.insert_text(&text);

        for (w, h) in sizes {
            buf.resize(w, h);
            buf.insert_text("x");
            prop_assert!(buf.cursor().pos.y < h);
            prop_assert_eq!(buf.visible_rows().len(), h);
        }
    }
}
