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


use std::ffi::OsStr;
use std::path::PathBuf;

use bp3d_glsl::environment::{Stage, DEFAULT_VERSION};
use bp3d_glsl::shader::Shader;
use phf::phf_map;

use crate::error::Error;

static STAGES: phf::Map<&'static str, Stage> = phf_map! {
    "vert" => Stage::Vertex,
    "frag" => Stage::Fragment
};

pub struct InputShaderFile
{
    pub path: PathBuf,
    pub stage: Stage,
    pub contents: String,
    pub shader: Option<Shader>
}

impl InputShaderFile
{
    pub fn new<T: Into<PathBuf>>(path: T, stage: Stage) -> Self
    {
        Self {
            path: path.into(),
            stage,
            contents: String::new(),
            shader: None
        }
    }

    /// Path as printed in messages; bytes which are not valid Unicode are replaced.
    pub fn name(&self) -> String
    {
        self.path.to_string_lossy().into_owned()
    }
}

pub struct Config
{
    pub default_version: u16,
    pub defines: Vec<(String, String)>,
    pub print_types: bool,
    pub all_uniforms: bool
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            default_version: DEFAULT_VERSION,
            defines: Vec::new(),
            print_types: false,
            all_uniforms: false
        }
    }
}

/// Parses `NAME` or `NAME=VALUE`; a bare name is defined to 1.
pub fn parse_define(define: &str) -> (String, String)
{
    match define.split_once('=') {
        Some((name, value)) => (name.into(), value.into()),
        None => (define.into(), "1".into())
    }
}

#[cfg(unix)]
fn split_stage(arg: &OsStr) -> Option<(PathBuf, String)>
{
    use std::os::unix::ffi::OsStrExt;
    let bytes = arg.as_bytes();
    let pos = bytes.iter().position(|v| *v == b'@')?;
    Some((
        PathBuf::from(OsStr::from_bytes(&bytes[..pos])),
        String::from_utf8_lossy(&bytes[pos + 1..]).into_owned()
    ))
}

#[cfg(not(unix))]
fn split_stage(arg: &OsStr) -> Option<(PathBuf, String)>
{
    //Paths which are not valid Unicode are replaced lossily
    let arg = arg.to_string_lossy();
    let (path, stage) = arg.split_once('@')?;
    Some((PathBuf::from(path), stage.into()))
}

/// Parses a single `<path>@<stage>` argument, splitting at the first `@`.
pub fn parse_input<T: AsRef<OsStr>>(arg: T) -> Result<InputShaderFile, Error>
{
    let arg = arg.as_ref();
    let malformed = || Error::MalformedArgument(arg.to_string_lossy().into_owned());
    let (path, stage) = split_stage(arg).ok_or_else(malformed)?;
    if path.as_os_str().is_empty() || stage.is_empty() {
        return Err(malformed());
    }
    let stage = *STAGES.get(stage.as_str()).ok_or(Error::UnknownStage(stage))?;
    Ok(InputShaderFile::new(path, stage))
}

pub fn parse_inputs<I>(args: I) -> Result<Vec<InputShaderFile>, Error>
where
    I: IntoIterator,
    I::Item: AsRef<OsStr>
{
    args.into_iter().map(parse_input).collect()
}

#[cfg(test)]
mod tests
{
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_inputs()
    {
        let files = parse_inputs(["shaders/a.vert@vert", "b.frag@frag"]).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from("shaders/a.vert"));
        assert_eq!(files[0].name(), "shaders/a.vert");
        assert_eq!(files[0].stage, Stage::Vertex);
        assert_eq!(files[1].path, PathBuf::from("b.frag"));
        assert_eq!(files[1].stage, Stage::Fragment);
        assert!(files[0].contents.is_empty());
        assert!(files[0].shader.is_none());
    }

    #[test]
    fn no_inputs()
    {
        let files = parse_inputs(std::iter::empty::<&str>()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn malformed_inputs()
    {
        for arg in ["a.vert", "@vert", "a.vert@", "@", ""] {
            let err = parse_input(arg).err().unwrap();
            assert!(matches!(err, Error::MalformedArgument(_)), "{}", arg);
            assert_eq!(err.to_string(), "Bad input file syntax - expected <filepath>:<stage>");
        }
    }

    #[test]
    fn unknown_stage()
    {
        let err = parse_input("a.geom@geom").err().unwrap();
        assert_eq!(err.to_string(), "Unknown shader stage 'geom'");
        let err = parse_input("a.vert@VERT").err().unwrap();
        assert_eq!(err.to_string(), "Unknown shader stage 'VERT'");
        //Split happens at the first separator
        let err = parse_input("a@vert@frag").err().unwrap();
        assert_eq!(err.to_string(), "Unknown shader stage 'vert@frag'");
    }

    #[test]
    fn first_error_wins()
    {
        let err = parse_inputs(["a.vert@vert", "b.frag@pixel", "c"]).err().unwrap();
        assert!(matches!(err, Error::UnknownStage(v) if v == "pixel"));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_path()
    {
        use std::os::unix::ffi::OsStrExt;
        let file = parse_input(OsStr::from_bytes(b"sh\xffder.frag@frag")).unwrap();
        assert_eq!(file.path.as_os_str().as_bytes(), b"sh\xffder.frag");
        assert_eq!(file.stage, Stage::Fragment);
        assert_eq!(file.name(), "sh\u{FFFD}der.frag");
        let err = parse_input(OsStr::from_bytes(b"sh\xffder.frag")).err().unwrap();
        assert!(matches!(err, Error::MalformedArgument(v) if v == "sh\u{FFFD}der.frag"));
    }

    #[test]
    fn defines()
    {
        assert_eq!(parse_define("FOO"), ("FOO".into(), "1".into()));
        assert_eq!(parse_define("FOO=2"), ("FOO".into(), "2".into()));
        assert_eq!(parse_define("FOO=a=b"), ("FOO".into(), "a=b".into()));
    }

    proptest! {
        #[test]
        fn missing_separator_is_malformed(arg in "[^@]*")
        {
            prop_assert!(matches!(parse_input(&arg), Err(Error::MalformedArgument(_))));
        }

        #[test]
        fn any_path_with_known_stage(path in "[^@]+", frag in any::<bool>())
        {
            let stage = if frag { "frag" } else { "vert" };
            let file = parse_input(&format!("{}@{}", path, stage)).unwrap();
            prop_assert_eq!(file.name(), path);
            prop_assert_eq!(file.stage, if frag { Stage::Fragment } else { Stage::Vertex });
        }

        #[test]
        fn unknown_stages_are_reported(stage in "[a-z]{1,8}")
        {
            prop_assume!(stage != "vert" && stage != "frag");
            let err = parse_input(&format!("shader.glsl@{}", stage)).err().unwrap();
            prop_assert_eq!(err.to_string(), format!("Unknown shader stage '{}'", stage));
        }
    }
}
