//! User-facing texts shown when an error carries no message of its own.

pub const START_FAILED: &str = "Erro ao iniciar higienização";
pub const FINALIZE_FAILED: &str = "Erro ao finalizar higienização";
pub const LOGIN_FAILED: &str = "Credenciais inválidas. Verifique e tente novamente.";
pub const REGISTER_FAILED: &str = "Erro ao criar conta";
pub const LOOKUP_FAILED: &str = "Setor não encontrado";
pub const LOAD_FAILED: &str = "Erro ao carregar registros";
pub const NFC_READ_FAILED: &str = "Falha ao ler tag NFC";

pub const FILL_ALL_FIELDS: &str = "Preencha todos os campos";
pub const BLANK_NOTES: &str = "Por favor, adicione observações sobre a higienização.";
pub const BLANK_CODE: &str = "Código do setor não informado";
pub const NOT_LOGGED_IN: &str = "Sessão expirada. Faça login novamente.";
