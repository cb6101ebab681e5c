//! Testing methods on Chirp8's public API
use chirp8::*;
use std::{collections::hash_map::DefaultHasher, hash::Hash};

#[test]
fn chip8() {
    let ch8 = Chip8::default(); // Default
    let ch82 = ch8.clone(); // Clone
    assert_eq!(ch8, ch82); // PartialEq
    println!("{ch8:?}"); // Debug
}

#[test]
fn initial_state() {
    let ch8 = Chip8::default();
    assert_eq!(0x200, ch8.cpu.pc());
    assert_eq!(0, ch8.cpu.i());
    assert_eq!(0, ch8.cpu.sp());
    assert_eq!(&[0; 16], ch8.cpu.v());
    assert_eq!(&[false; 16], ch8.cpu.keys());
    assert_eq!((0, 0), (ch8.cpu.delay(), ch8.cpu.sound()));
    assert!(ch8.screen.is_clear());
    // The font lives at the bottom of memory
    assert_eq!(&CHARSET[..], ch8.cpu.mem().get_region(Charset));
    assert!(ch8.cpu.mem().get_region(Program).iter().all(|&b| b == 0));
}

mod mem {
    use super::*;
    mod region {
        use super::*;
        #[test]
        fn copy() {
            let r1 = Program;
            let r2 = r1;
            assert_eq!(r1, r2);
        }
        #[test]
        fn display() {
            println!("{Charset}{Reserved}{Program}");
        }
        #[test]
        fn debug() {
            println!("{Charset:?}{Reserved:?}{Program:?}");
        }
        #[test]
        fn ord() {
            assert_eq!(Program, Charset.max(Reserved).max(Program));
            assert!(Charset < Reserved && Reserved < Program);
        }
        #[test]
        fn ranges() {
            assert_eq!(0x000..0x050, Charset.range());
            assert_eq!(0x000..0x200, Reserved.range());
            assert_eq!(0x200..0x1000, Program.range());
        }
        #[test]
        fn hash() {
            let mut hasher = DefaultHasher::new();
            Program.hash(&mut hasher);
            println!("{hasher:?}");
        }
    }

    #[test]
    fn out_of_bounds() {
        let mut mem = Mem::new();
        let pristine = mem.clone();
        assert!(mem.read(MEM_SIZE).is_err());
        assert!(mem.write(MEM_SIZE, 0xff).is_err());
        assert!(mem.load_block(0xfff, &[1, 2]).is_err());
        // no change has been made
        assert_eq!(mem, pristine);
    }

    #[test]
    fn load_block_overwrites_exactly() {
        let mut mem = Mem::new();
        mem.load_block(0x300, &[1, 2, 3]).unwrap();
        assert_eq!(&[0, 1, 2, 3, 0], mem.slice(0x2ff, 5).unwrap());
    }

    #[test]
    fn display() {
        println!("{}", Mem::new());
    }
}

mod cpu {
    use super::*;

    #[test]
    fn press_invalid_key() {
        let mut cpu = CPU::default();
        let cpu2 = cpu.clone();
        cpu.press(0x21345134)
            .expect_err("This should produce an Error::InvalidKey");
        // no change has been made, everything is safe.
        assert_eq!(cpu, cpu2);
    }

    #[test]
    fn release_invalid_key() {
        let mut cpu = CPU::default();
        let cpu2 = cpu.clone();
        cpu.release(0x21345134)
            .expect_err("This should produce an Error::InvalidKey");
        // no change has been made, everything is safe.
        assert_eq!(cpu, cpu2);
    }

    #[test]
    fn set_invalid_reg() {
        let mut cpu = CPU::default();
        let cpu2 = cpu.clone();
        cpu.set_v(0x21345134, 0xff)
            .expect_err("This should produce an Error::InvalidRegister");
        // no change has been made
        assert_eq!(cpu, cpu2);
    }

    #[test]
    fn load_program_preserves_flags() {
        let mut cpu = CPU::new(Flags {
            strict: true,
            quirks: Quirks::vip(),
            ..Default::default()
        });
        cpu.load_program(&[0x00, 0xe0]).unwrap();
        assert!(cpu.flags.strict);
        assert_eq!(Quirks::vip(), cpu.flags.quirks);
    }

    #[test]
    fn patch_running_program() {
        let mut screen = Screen::default();
        let mut cpu = CPU::default();
        cpu.load_program(&[
            0x60, 0x01, // 200: mov  #01, v0
            0x12, 0x00, // 202: jmp  200
        ])
        .unwrap();
        cpu.multistep(&mut screen, 2).unwrap();
        // rewrite the immediate in place, and go around again
        cpu.mem_mut().write(0x201, 0x7f).unwrap();
        cpu.step(&mut screen).unwrap();
        assert_eq!(0x7f, cpu.v()[0]);
        assert!(cpu.mem_mut().write(MEM_SIZE, 0).is_err());
    }

    mod flags {
        use super::*;
        #[test]
        fn clone() {
            let cf1 = Flags {
                debug: false,
                keypause: false,
                lastkey: None,
                ..Default::default()
            };
            let cf2 = cf1.clone();
            assert_eq!(cf1, cf2)
        }
        #[test]
        fn debug() {
            println!("{:?}", Flags::default());
        }
        #[test]
        fn default() {
            assert_eq!(
                Flags::default(),
                Flags {
                    debug: false,
                    strict: false,
                    console: false,
                    keypause: false,
                    lastkey: None,
                    quirks: Quirks::default(),
                }
            )
        }
        #[test]
        fn toggle_debug() {
            let mut flags = Flags::default();
            flags.debug();
            assert!(flags.debug);
            flags.debug();
            assert!(!flags.debug);
        }
        #[test]
        fn ord() {
            let cf1 = Flags::default();
            let cf2 = Flags {
                debug: true,
                keypause: true,
                ..Default::default()
            };
            assert!(cf1 < cf2);
            assert_eq!(Flags::default(), cf1.min(cf2));
        }
        #[test]
        fn hash() {
            let mut hasher = DefaultHasher::new();
            Flags::default().hash(&mut hasher);
            println!("{:?}", hasher);
        }
    }
}

mod dis {
    use super::*;
    use imperative_rs::InstructionSet;

    #[test]
    #[allow(clippy::clone_on_copy)]
    fn clone() {
        let opcode = Insn::decode(&[0xef, 0xa1]).unwrap().1; // random valid opcode
        let clone = opcode.clone();
        assert_eq!(opcode, clone);
    }
    #[test]
    fn debug() {
        println!("{:?}", Insn::decode(b"AA")) // "sne #41, v1"
    }
    #[test]
    fn display() {
        let (_, insn) = Insn::decode(&[0xd1, 0x25]).unwrap();
        assert_eq!("draw   #5, v1, v2", insn.to_string());
    }
    #[test]
    fn every_word() {
        // Every word either decodes, or disassembles as invalid
        let dis = Dis::default();
        for word in 0..=u16::MAX {
            let text = dis.once(word);
            assert_eq!(
                Insn::decode(&word.to_be_bytes()).is_err(),
                text.contains("inval"),
                "{word:04x}: {text}"
            );
        }
    }
}

mod error {
    use super::*;

    #[test]
    fn display() {
        let error = Error::InvalidSnapshot {
            field: "pc",
            reason: "4096 is outside of memory".to_owned(),
        };
        // Print it with Display and Debug
        println!("{error} {error:?}");
        assert!(error.to_string().contains("`pc`"));
    }

    #[test]
    fn fatality() {
        assert!(Error::OutOfBounds { addr: 0x1000, len: 1 }.is_fatal());
        assert!(Error::StackOverflow { pc: 0x200 }.is_fatal());
        assert!(Error::StackUnderflow { pc: 0x200 }.is_fatal());
        assert!(!Error::UnknownOpcode { word: 0x5001 }.is_fatal());
        assert!(!Error::InvalidKey { key: 16 }.is_fatal());
    }
}

mod quirks {
    use super::*;

    #[test]
    fn from_true() {
        let quirks_true = Quirks::from(true);
        assert_eq!(
            quirks_true,
            Quirks {
                bin_ops: true,
                shift: true,
                dma_inc: true,
                screen_wrap: true,
            }
        )
    }

    #[test]
    fn from_false() {
        let quirks_false = Quirks::from(false);
        assert_eq!(
            quirks_false,
            Quirks {
                bin_ops: false,
                shift: false,
                dma_inc: false,
                screen_wrap: false,
            }
        )
    }

    #[test]
    fn default() {
        assert_eq!(Quirks::from(true), Quirks::default());
        assert_eq!(Quirks::from(false), Quirks::vip());
    }

    #[test]
    fn eq() {
        assert_ne!(Quirks::from(false), Quirks::from(true));
    }

    #[test]
    fn ord() {
        assert!(Quirks::from(false) < Quirks::from(true));
        assert!(Quirks::from(true) == Quirks::from(false).max(Quirks::from(true)));
    }

    #[test]
    fn hash() {
        let mut hasher = DefaultHasher::new();
        Quirks::from(true).hash(&mut hasher);
        println!("{hasher:?}");
    }
}

mod screen {
    use super::*;

    #[test]
    fn dimensions() {
        let screen = Screen::default();
        assert_eq!(HEIGHT, screen.rows().len());
        assert_eq!(WIDTH, screen.rows()[0].len());
    }

    #[test]
    fn display() {
        let mut screen = Screen::default();
        screen.draw_sprite(0, 0, &CHARSET[0..5], true);
        println!("{screen}");
    }
}
