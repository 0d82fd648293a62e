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


use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::Error;
use crate::options::InputShaderFile;

fn read_file(path: &Path) -> std::io::Result<String>
{
    let mut file = File::open(path)?;
    let size = file.metadata()?.len() as usize;
    let mut buffer = Vec::with_capacity(size);
    file.read_to_end(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Loads the contents of every shader file, stopping at the first one which cannot be read.
pub fn load(files: &mut [InputShaderFile]) -> Result<(), Error>
{
    for file in files {
        file.contents = read_file(&file.path).map_err(|source| Error::FileUnreadable {
            path: file.name(),
            source
        })?;
        debug!("Loaded shader file '{}' ({} bytes)", file.name(), file.contents.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use bp3d_glsl::environment::Stage;

    #[test]
    fn load_existing_file()
    {
        let path = std::env::temp_dir().join(format!("shaderr-loader-{}.vert", std::process::id()));
        std::fs::write(&path, "void main() {}\n").unwrap();
        let mut files = vec![InputShaderFile::new(&path, Stage::Vertex)];
        load(&mut files).unwrap();
        assert_eq!(files[0].contents, "void main() {}\n");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_missing_file()
    {
        let mut files = vec![
            InputShaderFile::new("/nonexistent/shaderr/a.vert", Stage::Vertex),
            InputShaderFile::new("/nonexistent/shaderr/b.frag", Stage::Fragment)
        ];
        let err = load(&mut files).err().unwrap();
        assert_eq!(err.to_string(), "Cannot open shader file '/nonexistent/shaderr/a.vert'");
    }

    #[test]
    fn load_directory()
    {
        let dir = std::env::temp_dir();
        let mut files = vec![InputShaderFile::new(dir, Stage::Fragment)];
        assert!(matches!(load(&mut files), Err(Error::FileUnreadable { .. })));
    }
}
