//! Seed training corpus.
//!
//! Keyword lists per category, drawn from common Brazilian merchants and
//! statement phrasing. Single-token keywords are augmented with templated
//! variants ("pagamento X", "X compra") so short labels still contribute
//! bigram coverage.

const SEED_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Alimentação",
        &[
            "ifood", "uber eats", "rappi", "delivery", "mc donalds", "burger king", "subway",
            "pizza", "pizzaria", "lanchonete", "restaurante", "bar", "cafe", "cafeteria",
            "starbucks", "padaria", "confeitaria", "sorvete", "acai", "supermercado", "mercado",
            "atacadao", "carrefour", "pao de acucar", "assai", "compras", "feira", "hortifruti",
            "acougue", "mercearia",
        ],
    ),
    (
        "Transporte",
        &[
            "uber", "99", "99 pop", "cabify", "taxi", "mototaxi", "bike", "patinete", "posto",
            "combustivel", "gasolina", "etanol", "diesel", "ipiranga", "shell", "abastecimento",
            "estacionamento", "valet", "zona azul", "pedagio", "sem parar", "metro", "onibus",
            "trem", "passagem", "recarga", "oficina", "mecanico", "lava rapido", "troca de oleo",
        ],
    ),
    (
        "Lazer",
        &[
            "netflix", "spotify", "amazon prime", "disney plus", "hbo max", "youtube premium",
            "deezer", "globoplay", "crunchyroll", "twitch", "steam", "playstation", "xbox",
            "nintendo", "epic games", "jogos", "cinema", "cinemark", "ingresso", "filme",
            "teatro", "show", "festival", "evento", "balada", "festa", "happy hour", "livraria",
        ],
    ),
    (
        "Saúde",
        &[
            "farmacia", "drogaria", "drogasil", "raia", "pague menos", "remedios", "medicamento",
            "medico", "consulta", "hospital", "clinica", "dentista", "psicologo",
            "fisioterapeuta", "nutricionista", "laboratorio", "exame", "raio x", "ultrassom",
            "academia", "smartfit", "crossfit", "pilates", "yoga", "terapia", "massagem",
        ],
    ),
    (
        "Educação",
        &[
            "udemy", "coursera", "alura", "rocketseat", "curso", "aula", "treinamento",
            "workshop", "certificacao", "livro", "ebook", "audiobook", "faculdade",
            "universidade", "escola", "colegio", "graduacao", "mba", "material escolar",
            "papelaria", "ingles", "wizard", "duolingo",
        ],
    ),
    (
        "Moradia",
        &[
            "aluguel", "condominio", "iptu", "imobiliaria", "luz", "energia", "enel", "cemig",
            "agua", "sabesp", "gas", "ultragaz", "internet", "vivo", "claro", "tim", "oi",
            "telefone", "celular", "reforma", "manutencao", "pedreiro", "eletricista",
            "encanador", "limpeza", "faxina", "moveis", "decoracao",
        ],
    ),
    (
        "Salário",
        &[
            "pagamento", "salario", "proventos", "remuneracao", "ordenado", "ted recebida",
            "pix recebido", "deposito", "credito", "transferencia recebida", "receita",
            "honorarios", "freelance", "comissao", "bonus", "gratificacao", "ferias",
        ],
    ),
    (
        "Investimentos",
        &[
            "corretora", "xp investimentos", "rico", "clear", "avenue", "btg", "nuinvest",
            "bovespa", "acoes", "fii", "tesouro direto", "cdb", "lci", "lca", "fundos",
            "previdencia", "bitcoin", "ethereum", "cripto", "binance", "mercado bitcoin",
            "aporte", "aplicacao", "investimento", "renda fixa", "dividendos",
        ],
    ),
    (
        "Vestuário",
        &[
            "renner", "riachuelo", "marisa", "zara", "shein", "roupa", "calcado", "sapato",
            "tenis", "nike", "adidas", "sandalia", "chinelo", "havaianas", "bolsa", "mochila",
            "relogio", "oculos", "boutique", "sapataria", "costureira", "lavanderia",
        ],
    ),
    (
        "Eletrônicos",
        &[
            "magazine luiza", "magalu", "americanas", "submarino", "casas bahia", "ponto frio",
            "fast shop", "apple", "samsung", "xiaomi", "motorola", "notebook", "smartphone",
            "tablet", "televisao", "monitor", "mouse", "teclado", "fone", "headset", "camera",
            "console", "kabum", "pichau", "informatica",
        ],
    ),
    (
        "Pets",
        &[
            "petshop", "veterinario", "racao", "pet food", "vacina", "vermifugo", "antipulgas",
            "banho e tosa", "canil", "hotel pet", "cobasi", "petz", "petlove",
        ],
    ),
    (
        "Impostos",
        &[
            "imposto", "ipva", "imposto de renda", "tributo", "taxa", "multa", "darf",
            "receita federal", "prefeitura", "licenciamento", "detran",
        ],
    ),
    (
        "Seguros",
        &[
            "seguro", "seguradora", "apolice", "porto seguro", "bradesco seguros",
            "seguro auto", "seguro vida", "seguro saude", "seguro residencial",
            "seguro viagem",
        ],
    ),
    (
        "Outros",
        &[
            "diversos", "variados", "indefinido", "saque", "transferencia", "ted", "doc",
            "cartorio", "despachante", "correios", "sedex",
        ],
    ),
];

/// Raw (description, category) seed pairs, before normalization.
pub fn seed_corpus() -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (category, keywords) in SEED_KEYWORDS {
        for keyword in *keywords {
            pairs.push((keyword.to_string(), category.to_string()));

            // Single tokens get templated variants for bigram coverage.
            if !keyword.contains(' ') {
                pairs.push((format!("pagamento {keyword}"), category.to_string()));
                pairs.push((format!("{keyword} compra"), category.to_string()));
            }
        }
    }

    pairs
}
