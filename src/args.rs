use crate::Impl;
use anyhow::{Result, bail};
use std::env;

pub struct Args {
    pub benchmark: Vec<(Impl, Type)>,
    pub unpredictable: bool,
}

#[derive(Copy, Clone)]
pub enum Type {
    F32,
    F64,
}

pub fn parse() -> Result<Args> {
    let mut args = env::args_os();
    args.next().unwrap();

    let mut benchmark = Vec::new();
    let mut unpredictable = false;
    'args: for arg in args {
        if let Some(arg) = arg.to_str() {
            if arg == "--unpredictable" {
                unpredictable = true;
                continue;
            }
            let (lib, ty) = match arg.split_once(':') {
                Some((lib, ty)) => (lib, Some(ty)),
                None => (arg, None),
            };
            for imp in crate::IMPLS {
                if imp.name == lib {
                    match ty {
                        None => {
                            benchmark.push((*imp, Type::F32));
                            benchmark.push((*imp, Type::F64));
                            continue 'args;
                        }
                        Some("f32") => {
                            benchmark.push((*imp, Type::F32));
                            continue 'args;
                        }
                        Some("f64") => {
                            benchmark.push((*imp, Type::F64));
                            continue 'args;
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        bail!("unsupported: {}", arg.to_string_lossy());
    }

    if benchmark.is_empty() {
        for imp in crate::IMPLS {
            benchmark.push((*imp, Type::F32));
            benchmark.push((*imp, Type::F64));
        }
    }

    Ok(Args {
        benchmark,
        unpredictable,
    })
}
