//! JNI entry points used by the Android module package.

use std::ptr;

use jni::JNIEnv;
use jni::objects::{JClass, JString};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jdouble, jstring};

use crate::ffi::catch_panic;
use crate::module;

const ILLEGAL_ARGUMENT: &str = "java/lang/IllegalArgumentException";
const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_basicmodule_BasicModuleModule_nativeNumericMethod(
    _env: JNIEnv,
    _class: JClass,
    arg: jdouble,
) -> jdouble {
    module::numeric_method(arg)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_basicmodule_BasicModuleModule_nativeBooleanMethod(
    _env: JNIEnv,
    _class: JClass,
    arg: jboolean,
) -> jboolean {
    if module::boolean_method(arg != JNI_FALSE) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Throws `IllegalArgumentException` and returns null when `arg` cannot be read, or
/// `RuntimeException` if the call panics.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_basicmodule_BasicModuleModule_nativeStringMethod<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    arg: JString<'local>,
) -> jstring {
    match catch_panic("nativeStringMethod", ptr::null_mut(), || string_method(&mut env, &arg)) {
        None => {
            let _ = env.throw_new(RUNTIME_EXCEPTION, "panic in nativeStringMethod");
            ptr::null_mut()
        }
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            log::warn!(target: "basicmodule", "nativeStringMethod failed: {err}");
            if !matches!(err, jni::errors::Error::JavaException) {
                let _ = env.throw_new(ILLEGAL_ARGUMENT, err.to_string());
            }
            ptr::null_mut()
        }
    }
}

fn string_method(env: &mut JNIEnv, arg: &JString) -> Result<jstring, jni::errors::Error> {
    let value: String = env.get_string(arg)?.into();
    let output = env.new_string(module::string_method(value))?;
    Ok(output.into_raw())
}
