// Copyright (c) 2022, BlockProject 3D
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//     * Redistributions in binary form must reproduce the above copyright notice,
//       this list of conditions and the following disclaimer in the documentation
//       and/or other materials provided with the distribution.
//     * Neither the name of BlockProject 3D nor the names of its contributors
//       may be used to endorse or promote products derived from this software
//       without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.


mod driver;
mod error;
mod loader;
mod options;

use bp3d_glsl::environment::DEFAULT_VERSION;
use clap::{error::ErrorKind, Arg, ArgMatches, Command};
use cli_common::{alloc_verbosity_level, init_logger};
use log::{debug, info};

use crate::error::Error;
use crate::options::{parse_define, Config};

const PROG_NAME: &str = env!("CARGO_PKG_NAME");
const PROG_VERSION: &str = env!("CARGO_PKG_VERSION");

fn execute(config: &Config, args: &ArgMatches) -> Result<(), Error> {
    let mut files = options::parse_inputs(args.values_of_os("shader").unwrap_or_default())?;
    debug!("{} shader file(s) on the command line", files.len());
    loader::load(&mut files)?;
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    driver::run(config, &mut files, &mut stdout.lock(), &mut stderr.lock())
}

fn run() -> i32 {
    let matches = Command::new(PROG_NAME)
        .author("BlockProject 3D")
        .about("BlockProject 3D SDK - Shader Reflector")
        .version(PROG_VERSION)
        .args([
            Arg::new("verbose").short('v').long("verbose").multiple_occurrences(true)
                .help("Enable verbose output"),
            Arg::new("glsl_version").short('g').long("glsl-version").takes_value(true)
                .validator(|v| v.parse::<u16>())
                .help("GLSL version to assume for shaders without a #version directive"),
            Arg::new("define").short('D').long("define").takes_value(true).multiple_occurrences(true)
                .help("Define a preprocessor macro (NAME or NAME=VALUE)"),
            Arg::new("types").short('t').long("types")
                .help("Print the type of each identified uniform"),
            Arg::new("all_uniforms").short('a').long("all-uniforms")
                .help("Also print uniforms which are not used by any shader"),
            Arg::new("shader").multiple_values(true).allow_invalid_utf8(true)
                .help("List of shader files to process, each written as <path>@<stage> with stage one of vert, frag")
        ]).try_get_matches();
    let matches = match matches {
        Ok(v) => v,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1
            };
        }
    };
    alloc_verbosity_level(matches.occurrences_of("verbose"));
    info!("Initializing BlockProject 3D Shader Reflector...");
    let config = Config {
        default_version: matches.value_of_t("glsl_version").unwrap_or(DEFAULT_VERSION),
        defines: matches.values_of("define").unwrap_or_default().map(parse_define).collect(),
        print_types: matches.is_present("types"),
        all_uniforms: matches.is_present("all_uniforms")
    };
    if let Err(e) = execute(&config, &matches) {
        eprintln!("{}", e);
        1
    } else {
        0
    }
}

fn main() {
    init_logger(run);
}
