#[cfg(test)]
mod core {
    mod bits;
    mod features;
    mod imm;
    mod label;
}

#[cfg(test)]
mod backend {
    mod code_buffer;
    mod compress;
    mod compressed;
    mod patch;
    mod probe;
    mod scalar;
    mod vector;
}

#[cfg(test)]
mod properties;
