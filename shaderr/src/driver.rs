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


use std::io::Write;

use bp3d_glsl::environment::Environment;
use bp3d_glsl::program::Builder as ProgramBuilder;
use bp3d_glsl::reflection::ReflectionOptions;
use bp3d_glsl::shader::{Builder, Part};
use log::{debug, info};

use crate::error::Error;
use crate::options::{Config, InputShaderFile};

fn build_environment(config: &Config, file: &InputShaderFile) -> Environment
{
    let mut env = Environment::new(file.stage).default_version(config.default_version);
    for (name, value) in &config.defines {
        env = env.define(name, value);
    }
    env
}

/// Compiles every file; a failed file is reported and kept so that it still reaches the linker.
pub fn compile<O: Write, E: Write>(config: &Config, files: &mut [InputShaderFile], out: &mut O, err: &mut E) -> Result<(), Error>
{
    info!("Compiling {} shader(s)...", files.len());
    for file in files {
        let name = file.name();
        debug!("Compiling {} shader '{}'", file.stage, name);
        let shader = Builder::new(build_environment(config, file))
            .add_part(Part::new_with_name(&file.contents, &name))
            .parse();
        if shader.check() {
            writeln!(out, "Successfully compiled shader '{}'", name)?;
        } else {
            write!(err, "{}", shader.get_info_log())?;
            writeln!(err, "Errors occurred whilst compiling shader '{}'", name)?;
        }
        file.shader = Some(shader);
    }
    Ok(())
}

/// Links all compiled files and prints the uniforms of the resulting program.
pub fn link_reflect<O: Write, E: Write>(config: &Config, files: &[InputShaderFile], out: &mut O, err: &mut E) -> Result<(), Error>
{
    let program = files
        .iter()
        .filter_map(|v| v.shader.as_ref())
        .fold(ProgramBuilder::new(), |builder, shader| builder.add_shader(shader))
        .link();
    write!(err, "{}", program.get_info_log())?;
    if !program.check() {
        return Err(Error::LinkFailure);
    }
    writeln!(out, "Successfully linked shaders!")?;
    let mut options = ReflectionOptions::new();
    if config.all_uniforms {
        options = options.all_uniforms();
    }
    let reflection = program.build_reflection(&options).map_err(Error::Reflection)?;
    for uniform in reflection.uniforms() {
        //The type field is left blank unless explicitly requested
        let ty = if config.print_types { uniform.get_type_name() } else { "" };
        writeln!(out, "Identified uniform: {} ({})", uniform.get_name(), ty)?;
    }
    Ok(())
}

pub fn run<O: Write, E: Write>(config: &Config, files: &mut [InputShaderFile], out: &mut O, err: &mut E) -> Result<(), Error>
{
    compile(config, files, out, err)?;
    link_reflect(config, files, out, err)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use bp3d_glsl::environment::Stage;

    const VERTEX: &str = "#version 450
layout(location = 0) in vec3 a_position;
out vec2 v_uv;
uniform Camera
{
    mat4 u_view_projection;
};
void main()
{
    v_uv = a_position.xy;
    gl_Position = u_view_projection * vec4(a_position, 1.0);
}
";

    const FRAGMENT: &str = "#version 450
in vec2 v_uv;
layout(location = 0) out vec4 o_color;
uniform sampler2D u_albedo;
uniform Lighting
{
    vec4 ambient;
} lighting;
void main()
{
    o_color = texture(u_albedo, v_uv) * lighting.ambient;
}
";

    fn file(path: &str, stage: Stage, contents: &str) -> InputShaderFile
    {
        let mut file = InputShaderFile::new(path, stage);
        file.contents = contents.into();
        file
    }

    fn run_capture(config: &Config, files: &mut [InputShaderFile]) -> (Result<(), Error>, String, String)
    {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let res = run(config, files, &mut out, &mut err);
        (res, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn compile_link_reflect()
    {
        let mut files = vec![file("a.vert", Stage::Vertex, VERTEX), file("b.frag", Stage::Fragment, FRAGMENT)];
        let (res, out, err) = run_capture(&Config::default(), &mut files);
        assert!(res.is_ok(), "{}", err);
        assert_eq!(err, "");
        assert_eq!(
            out,
            "Successfully compiled shader 'a.vert'
Successfully compiled shader 'b.frag'
Successfully linked shaders!
Identified uniform: u_view_projection ()
Identified uniform: u_albedo ()
Identified uniform: Lighting.ambient ()
"
        );
        assert!(files.iter().all(|v| v.shader.as_ref().map(|s| s.check()).unwrap_or(false)));
    }

    #[test]
    fn anonymous_block_members_use_bare_names()
    {
        let code = "#version 450
uniform Anon { mat4 a_mvp; };
uniform Named { mat4 n_mvp; } inst;
void main()
{
    gl_Position = a_mvp * inst.n_mvp * vec4(1.0);
}
";
        let mut files = vec![file("blocks.vert", Stage::Vertex, code)];
        let (res, out, err) = run_capture(&Config::default(), &mut files);
        assert!(res.is_ok(), "{}", err);
        assert!(out.ends_with("Identified uniform: a_mvp ()\nIdentified uniform: Named.n_mvp ()\n"), "{}", out);
    }

    #[test]
    fn print_types()
    {
        let mut files = vec![file("a.vert", Stage::Vertex, VERTEX), file("b.frag", Stage::Fragment, FRAGMENT)];
        let config = Config {
            print_types: true,
            ..Config::default()
        };
        let (res, out, _) = run_capture(&config, &mut files);
        assert!(res.is_ok());
        assert!(out.contains("Identified uniform: u_view_projection (mat4)\n"));
        assert!(out.contains("Identified uniform: u_albedo (sampler2D)\n"));
        assert!(out.contains("Identified uniform: Lighting.ambient (vec4)\n"));
    }

    #[test]
    fn compile_failure_still_links()
    {
        let broken = "#version 450\nlayout(location = 0) out vec4 o_color;\nvoid main()\n{\n    o_color = vec4(1.0)\n}\n";
        let mut files = vec![file("broken.frag", Stage::Fragment, broken), file("a.vert", Stage::Vertex, VERTEX)];
        let (res, out, err) = run_capture(&Config::default(), &mut files);
        assert!(matches!(res, Err(Error::LinkFailure)));
        //Both files went through the compiler
        assert!(files.iter().all(|v| v.shader.is_some()));
        assert_eq!(out, "Successfully compiled shader 'a.vert'\n");
        assert!(err.contains("ERROR: 0:6:"), "{}", err);
        assert!(err.contains("Errors occurred whilst compiling shader 'broken.frag'\n"));
        assert!(err.contains("ERROR: Linking fragment stage: 'broken.frag' was not successfully compiled"));
    }

    #[test]
    fn empty_program()
    {
        let (res, out, err) = run_capture(&Config::default(), &mut []);
        assert!(res.is_ok());
        assert_eq!(out, "Successfully linked shaders!\n");
        assert_eq!(err, "");
    }

    #[test]
    fn defines_reach_the_preprocessor()
    {
        let code = "#version 450
layout(location = 0) out vec4 o_color;
void main()
{
    o_color = vec4(BRIGHTNESS);
}
";
        let mut files = vec![file("define.frag", Stage::Fragment, code)];
        let (res, _, err) = run_capture(&Config::default(), &mut files);
        assert!(res.is_err());
        assert!(err.contains("Errors occurred whilst compiling shader 'define.frag'"));
        let config = Config {
            defines: vec![("BRIGHTNESS".into(), "0.5".into())],
            ..Config::default()
        };
        let mut files = vec![file("define.frag", Stage::Fragment, code)];
        let (res, out, err) = run_capture(&config, &mut files);
        assert!(res.is_ok(), "{}", err);
        assert!(out.starts_with("Successfully compiled shader 'define.frag'\n"));
    }
}
